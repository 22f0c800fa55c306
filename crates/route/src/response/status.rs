//! Response constructors, one per supported status.
//!
//! ```
//! use micro_route::response::{self, status};
//!
//! let response = status::created().with(response::header("Location", "/users/42"));
//! assert_eq!(response.status(), http::StatusCode::CREATED);
//! assert_eq!(status::by_name("NotImplemented"), Some(http::StatusCode::NOT_IMPLEMENTED));
//! ```

use super::Response;
use http::StatusCode;

macro_rules! status_table {
    ($($method:ident => $code:ident, $name:literal;)+) => {
        $(
            #[doc = concat!("Creates an empty `", $name, "` response.")]
            #[inline]
            pub fn $method() -> Response {
                Response::new(StatusCode::$code)
            }
        )+

        /// Canonical short names of every status with a constructor in this module.
        pub static TABLE: &[(&str, StatusCode)] = &[$(($name, StatusCode::$code)),+];
    };
}

status_table! {
    ok => OK, "OK";
    created => CREATED, "Created";
    accepted => ACCEPTED, "Accepted";
    non_authoritative_info => NON_AUTHORITATIVE_INFORMATION, "NonAuthoritativeInfo";
    no_content => NO_CONTENT, "NoContent";
    reset_content => RESET_CONTENT, "ResetContent";
    multiple_choices => MULTIPLE_CHOICES, "MultipleChoices";
    moved_permanently => MOVED_PERMANENTLY, "MovedPermanently";
    found => FOUND, "Found";
    see_other => SEE_OTHER, "SeeOther";
    not_modified => NOT_MODIFIED, "NotModified";
    use_proxy => USE_PROXY, "UseProxy";
    temporary_redirect => TEMPORARY_REDIRECT, "TemporaryRedirect";
    permanent_redirect => PERMANENT_REDIRECT, "PermanentRedirect";
    bad_request => BAD_REQUEST, "BadRequest";
    unauthorized => UNAUTHORIZED, "Unauthorized";
    payment_required => PAYMENT_REQUIRED, "PaymentRequired";
    forbidden => FORBIDDEN, "Forbidden";
    not_found => NOT_FOUND, "NotFound";
    method_not_allowed => METHOD_NOT_ALLOWED, "MethodNotAllowed";
    not_acceptable => NOT_ACCEPTABLE, "NotAcceptable";
    proxy_auth_required => PROXY_AUTHENTICATION_REQUIRED, "ProxyAuthRequired";
    request_timeout => REQUEST_TIMEOUT, "RequestTimeout";
    conflict => CONFLICT, "Conflict";
    gone => GONE, "Gone";
    length_required => LENGTH_REQUIRED, "LengthRequired";
    precondition_failed => PRECONDITION_FAILED, "PreconditionFailed";
    request_entity_too_large => PAYLOAD_TOO_LARGE, "RequestEntityTooLarge";
    request_uri_too_long => URI_TOO_LONG, "RequestURITooLong";
    unsupported_media_type => UNSUPPORTED_MEDIA_TYPE, "UnsupportedMediaType";
    unprocessable_entity => UNPROCESSABLE_ENTITY, "UnprocessableEntity";
    too_many_requests => TOO_MANY_REQUESTS, "TooManyRequests";
    internal_server_error => INTERNAL_SERVER_ERROR, "InternalServerError";
    not_implemented => NOT_IMPLEMENTED, "NotImplemented";
    bad_gateway => BAD_GATEWAY, "BadGateway";
    service_unavailable => SERVICE_UNAVAILABLE, "ServiceUnavailable";
    gateway_timeout => GATEWAY_TIMEOUT, "GatewayTimeout";
    http_version_not_supported => HTTP_VERSION_NOT_SUPPORTED, "HTTPVersionNotSupported";
}

/// Looks a status up by its canonical short name, e.g. `BadRequest`.
pub fn by_name(name: &str) -> Option<StatusCode> {
    TABLE.iter().find(|(n, _)| *n == name).map(|(_, code)| *code)
}

/// Returns the canonical short name of `status`, if it is in the table.
pub fn name_of(status: StatusCode) -> Option<&'static str> {
    TABLE.iter().find(|(_, code)| *code == status).map(|(name, _)| *name)
}
