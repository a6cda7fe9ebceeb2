use super::*;
use crate::model::{ConfigMap, ConfigValue, MetricData, MetricType, Namespace};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Args {
    #[serde(default)]
    config: ConfigMap,
}

fn encoders() -> Vec<Box<dyn Encoder>> {
    vec![Box::new(JsonEncoder), Box::new(YamlEncoder)]
}

#[test]
fn test_metric_survives_each_encoding() {
    let metric = MetricType::new(
        Namespace::new(["foo"])
            .add_dynamic_element("test", "dynamic")
            .add_static_element("bar"),
        2,
    )
    .with_data(7i64)
    .with_tag("host", "a");

    for encoder in encoders() {
        let bytes = encoder.encode(&metric).unwrap();
        let decoded: MetricType = encoder.decode(&bytes).unwrap();
        assert_eq!(decoded, metric, "encoding {}", encoder.name());
        assert_eq!(decoded.namespace.to_string(), "/foo/*/bar");
    }
}

#[test]
fn test_empty_payload_decodes_to_default() {
    for encoder in encoders() {
        let args: Args = encoder.decode_or_default(&[]).unwrap();
        assert_eq!(args, Args::default());
    }
}

#[test]
fn test_garbage_is_decode_error() {
    let encoder: Box<dyn Encoder> = Box::new(JsonEncoder);
    let err = encoder.decode::<Args>(b"{not json").unwrap_err();
    assert!(matches!(err, EncodingError::Decode { ref encoding, .. } if encoding == "json"));
}

#[test]
fn test_wrong_shape_is_decode_error() {
    let encoder: Box<dyn Encoder> = Box::new(YamlEncoder);
    let err = encoder.decode::<MetricType>(b"- 1\n- 2\n").unwrap_err();
    assert!(err.to_string().starts_with("Failed to decode yaml payload"));
}

#[test]
fn test_json_payload_is_plain_json() {
    let encoder: Box<dyn Encoder> = Box::new(JsonEncoder);
    let bytes = encoder
        .encode(&Args {
            config: ConfigMap::new().with("user", "root"),
        })
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("\"user\""));
}

#[test]
fn test_floats_survive_bit_for_bit() {
    let values = [
        1.0715660391465826e-75,
        0.1 + 0.2,
        f64::MIN_POSITIVE,
        5e-324,
        f64::MAX,
        -0.0,
        0.1234,
        std::f64::consts::PI,
    ];

    for encoder in encoders() {
        for value in values {
            let metric = MetricType::new(Namespace::new(["float"]), 1)
                .with_data(value)
                .with_config(ConfigMap::new().with("threshold", value));
            let bytes = encoder.encode(&metric).unwrap();
            let decoded: MetricType = encoder.decode(&bytes).unwrap();

            let Some(MetricData::Float(data)) = decoded.data else {
                panic!("expected float data from {}", encoder.name());
            };
            assert_eq!(data.to_bits(), value.to_bits(), "{} via {}", value, encoder.name());
            assert_eq!(
                decoded.config.get("threshold"),
                Some(&ConfigValue::Float(value)),
                "{} via {}",
                value,
                encoder.name()
            );
        }
    }
}

#[test]
fn test_non_finite_float_is_encode_error() {
    for encoder in encoders() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let metric = MetricType::new(Namespace::new(["gauge"]), 1).with_data(value);
            let err = encoder.encode(&metric).unwrap_err();
            assert!(
                matches!(err, EncodingError::Encode { ref encoding, .. } if encoding == encoder.name()),
                "{} via {}: {}",
                value,
                encoder.name(),
                err
            );
        }
    }
}

#[test]
fn test_non_finite_config_value_is_encode_error() {
    let encoder: Box<dyn Encoder> = Box::new(JsonEncoder);
    let args = Args {
        config: ConfigMap::new().with("ratio", f64::NAN),
    };
    let err = encoder.encode(&args).unwrap_err();
    assert!(err.to_string().contains("non-finite float"));
}
