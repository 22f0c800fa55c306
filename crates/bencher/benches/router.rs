use bencher::{RouteTable, TestCase};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use micro_route::context::Context;
use micro_route::handler::handler_fn;
use micro_route::lens::Optic;
use micro_route::route::{Router, Uri, get};
use micro_route::trie::{Edge, Trie};
use micro_route::{Request, lens};
use std::hint::black_box;
use tokio::runtime::Runtime;

static SMALL: RouteTable = RouteTable::new(&["/", "/echo", "/users/:id", "/users/:id/posts", "/files/*"], &["/echo", "/users/42/posts", "/files/a/b/c"]);

static GITHUB: RouteTable = RouteTable::new(
    &[
        "/authorizations",
        "/authorizations/:id",
        "/applications/:client_id/tokens/:access_token",
        "/events",
        "/repos/:owner/:repo/events",
        "/networks/:owner/:repo/events",
        "/orgs/:org/events",
        "/users/:user/received_events",
        "/users/:user/received_events/public",
        "/users/:user/events",
        "/users/:user/events/public",
        "/users/:user/events/orgs/:org",
        "/feeds",
        "/notifications",
        "/repos/:owner/:repo/notifications",
        "/notifications/threads/:id",
        "/notifications/threads/:id/subscription",
        "/repos/:owner/:repo/stargazers",
        "/users/:user/starred",
        "/user/starred",
        "/user/starred/:owner/:repo",
        "/repos/:owner/:repo/subscribers",
        "/users/:user/subscriptions",
        "/user/subscriptions",
        "/repos/:owner/:repo/subscription",
        "/users/:user/gists",
        "/gists",
        "/gists/:id",
        "/gists/:id/star",
        "/repos/:owner/:repo/git/blobs/:sha",
        "/repos/:owner/:repo/git/commits/:sha",
        "/repos/:owner/:repo/git/refs",
        "/repos/:owner/:repo/git/tags/:sha",
        "/repos/:owner/:repo/git/trees/:sha",
        "/issues",
        "/user/issues",
        "/orgs/:org/issues",
        "/repos/:owner/:repo/issues",
        "/repos/:owner/:repo/issues/:number",
        "/repos/:owner/:repo/assignees",
        "/repos/:owner/:repo/assignees/:assignee",
        "/repos/:owner/:repo/issues/:number/comments",
        "/repos/:owner/:repo/contents/*",
        "/search/repositories",
        "/search/code",
        "/legacy/issues/search/:owner/:repository/:state/:keyword",
        "/users/:user",
        "/user",
        "/users",
        "/emails",
        "/users/:user/followers",
        "/user/followers",
        "/users/:user/following/:target_user",
    ],
    &["/user/starred", "/repos/foldright/micro/git/commits/abc123", "/users/joe/events/orgs/rust", "/legacy/issues/search/a/b/open/trie", "/repos/a/b/contents/src/lib.rs"],
);

#[derive(Debug, Default)]
struct Params {
    value: String,
}

fn create_test_cases() -> Vec<TestCase> {
    vec![TestCase::small("small_table", SMALL), TestCase::large("github_api", GITHUB)]
}

fn trie(table: &RouteTable) -> Trie<usize> {
    let mut trie: Trie<usize> = Trie::new();
    for (index, segments) in table.segments().enumerate() {
        *trie.entry(segments.into_iter().map(Edge::segment)) = index;
    }
    trie
}

fn router(table: &RouteTable) -> Router {
    let value: Optic = lens!(Params, value).into();
    table
        .patterns()
        .iter()
        .fold(Router::builder(), |builder, pattern| {
            let captures = pattern.split('/').filter(|segment| segment.starts_with(':') || *segment == "*").count();
            let uri = Uri::parse(pattern, std::iter::repeat_n(value.clone(), captures)).expect("benchmark patterns should be valid");
            builder.route(uri, get(handler_fn(|_: &mut Context| "ok")))
        })
        .build()
        .expect("benchmark routes should build")
}

fn benchmark_trie_lookup(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("trie_lookup");

    for case in create_test_cases() {
        let trie = trie(case.table());
        group.throughput(Throughput::Elements(case.table().lookups().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let mut values = Vec::with_capacity(8);
            b.iter(|| {
                for lookup in case.table().lookups() {
                    values.clear();
                    black_box(trie.lookup(lookup, &mut values).expect("lookup should hit a route"));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_router_serve(criterion: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime should start");
    let mut group = criterion.benchmark_group("router_serve");

    for case in create_test_cases() {
        let router = router(case.table());
        group.throughput(Throughput::Elements(case.table().lookups().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            b.iter_batched(
                || case.table().lookups().iter().map(|lookup| Context::new(Request::builder().uri(*lookup).body(()).expect("lookup should be a valid uri"))).collect::<Vec<_>>(),
                |contexts| {
                    for mut ctx in contexts {
                        black_box(runtime.block_on(router.serve(&mut ctx)));
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(routing, benchmark_trie_lookup, benchmark_router_serve);
criterion_main!(routing);
