use serde::Serialize;

/// Result of a non-destructive read from a queue.
///
/// A read of exactly one element gives back that element (or nothing, if the queue is too short),
/// any other count gives back a list, which may be shorter than requested or empty.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Peek<T> {
    One(Option<T>),
    Many(Vec<T>),
}

impl<T> Peek<T> {
    pub fn len(&self) -> usize {
        match self {
            Peek::One(Some(_)) => 1,
            Peek::One(None) => 0,
            Peek::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn length() {
        assert_eq!(Peek::One(Some(1)).len(), 1);
        assert!(Peek::<u8>::One(None).is_empty());
        assert_eq!(Peek::Many(vec![1, 2]).len(), 2);
        assert!(Peek::<u8>::Many(Vec::new()).is_empty());
    }

    #[test]
    fn json_shape() {
        assert_eq!(serde_json::to_string(&Peek::One(Some("a"))).unwrap(), "\"a\"");
        assert_eq!(serde_json::to_string(&Peek::<&str>::One(None)).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Peek::Many(vec!["a", "b"])).unwrap(), "[\"a\",\"b\"]");
    }
}
