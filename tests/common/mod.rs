#![allow(dead_code)]

pub mod fixtures {
    use brrtbind::value::convert;
    use brrtbind::{FieldError, FieldValue, Params, Receiver, Record};
    use serde_json::Value;

    /// A string value that parses its own request input.
    #[derive(Debug, Default, Clone, PartialEq)]
    pub struct Emote(pub String);

    impl FieldValue for Emote {
        fn to_value(&self) -> Value {
            Value::String(self.0.clone())
        }

        fn coerce_from(&mut self, value: Value) -> Result<(), FieldError> {
            self.0 = convert(value)?;
            Ok(())
        }

        fn as_receiver(&mut self) -> Option<&mut dyn Receiver> {
            Some(self)
        }
    }

    impl Receiver for Emote {
        fn receive(&mut self, value: Value) -> anyhow::Result<()> {
            let text = value
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("emote must be a string"))?;
            self.0 = format!("{text}! :D");
            Ok(())
        }
    }

    #[derive(Debug, Default, Record)]
    pub struct Scenario {
        #[request(",required")]
        pub foo: i64,
        pub bar: f64,
        pub baz: String,
        pub qux: Option<Emote>,
    }

    /// Build a parameter mapping from string pairs.
    pub fn form(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    /// Build a parameter mapping from a JSON object literal.
    pub fn json_params(value: Value) -> Params {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            other => panic!("expected a JSON object, got {other}"),
        }
    }
}

pub mod tracing_util {
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Install a test subscriber honouring `RUST_LOG`, once per process.
    pub fn init() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_test_writer()
                .try_init();
        });
    }
}
