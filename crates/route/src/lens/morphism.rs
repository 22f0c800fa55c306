use super::{Optic, Value};
use crate::LensError;

/// The insertion ordered list of staged `(optic, value)` pairs of one request.
///
/// Rolling back a branch is a [`truncate`](Morphism::truncate) to the length
/// saved on entry, so nothing is copied while matchers compose.
#[derive(Debug, Clone, Default)]
pub struct Morphism {
    arrows: Vec<(Optic, Value)>,
}

impl Morphism {
    pub fn new() -> Self {
        Self { arrows: Vec::with_capacity(8) }
    }

    pub fn push(&mut self, optic: Optic, value: Value) {
        self.arrows.push((optic, value));
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.arrows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.arrows.is_empty()
    }

    pub fn truncate(&mut self, len: usize) {
        self.arrows.truncate(len);
    }

    pub fn clear(&mut self) {
        self.arrows.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Optic, Value)> {
        self.arrows.iter()
    }

    /// Writes every staged value into `target` in insertion order.
    ///
    /// A field staged twice ends up holding the last value. The first failing
    /// assignment stops the walk and its error is returned.
    pub fn apply<S: 'static>(&self, target: &mut S) -> Result<(), LensError> {
        for (optic, value) in &self.arrows {
            optic.apply(target, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Morphism;
    use crate::lens::Value;
    use crate::{LensError, lens, lenses};

    #[derive(Debug, Default)]
    struct Pair {
        left: i32,
        right: String,
    }

    #[test]
    fn test_last_staged_value_wins() {
        let (left, right) = lenses!(Pair { left, right });
        let mut morphism = Morphism::new();
        morphism.push((&left).into(), left.parse("1").unwrap());
        morphism.push((&right).into(), right.parse("a").unwrap());
        morphism.push((&left).into(), left.parse("2").unwrap());

        let mut pair = Pair::default();
        morphism.apply(&mut pair).unwrap();
        assert_eq!(pair.left, 2);
        assert_eq!(pair.right, "a");
    }

    #[test]
    fn test_apply_stops_at_first_error() {
        let (left, right) = lenses!(Pair { left, right });
        let mut morphism = Morphism::new();
        morphism.push((&left).into(), Value::Text("oops".into()));
        morphism.push((&right).into(), Value::Text("never".into()));

        let mut pair = Pair::default();
        let err = morphism.apply(&mut pair).unwrap_err();
        assert!(matches!(err, LensError::Decode { field: "left", .. }));
        assert_eq!(pair.right, "");
    }

    #[test]
    fn test_truncate_drops_tail() {
        let left = lens!(Pair, left);
        let mut morphism = Morphism::new();
        morphism.push((&left).into(), Value::Integer(1));
        morphism.push((&left).into(), Value::Integer(2));
        morphism.truncate(1);

        let mut pair = Pair::default();
        morphism.apply(&mut pair).unwrap();
        assert_eq!(morphism.len(), 1);
        assert_eq!(pair.left, 1);

        morphism.clear();
        assert!(morphism.is_empty());
    }
}
