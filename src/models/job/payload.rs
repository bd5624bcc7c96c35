use serde::{Deserialize, Serialize};

/// Job definition pushed onto a queue by producers, and delivered to workers when reserved.
///
/// `class` names the code a worker should run, `args` are passed to it in order. Neither is
/// interpreted here.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub class: String,

    #[serde(default)]
    pub args: Vec<serde_json::Value>,
}

impl Payload {
    pub fn new<S: Into<String>>(class: S, args: Vec<serde_json::Value>) -> Self {
        Self { class: class.into(), args }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn args(&self) -> &[serde_json::Value] {
        &self.args
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialisation() {
        let payload = Payload::new("Mailer", vec![json!("a@x.com"), json!(3)]);
        assert_eq!(
            serde_json::to_string(&payload).unwrap(),
            r#"{"class":"Mailer","args":["a@x.com",3]}"#
        );
    }

    #[test]
    fn args_default_to_empty() {
        let payload: Payload = serde_json::from_str(r#"{"class":"Noop"}"#).unwrap();
        assert_eq!(payload.class(), "Noop");
        assert!(payload.args().is_empty());

        assert!(serde_json::from_str::<Payload>(r#"{"args":[]}"#).is_err());
    }
}
