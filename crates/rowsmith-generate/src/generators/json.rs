use rand::Rng;
use serde_json::{Map, Number, Value};

use super::text::random_string;

const MIN_PROPERTIES: usize = 3;
const MAX_PROPERTIES: usize = 7;
const KEY_SPACE: u32 = 1000;

/// Build a small flat JSON object with mixed value kinds.
///
/// Keys are distinct `k<n>` tokens; each value is a string, integer, float,
/// boolean or short integer array, chosen uniformly.
pub fn synthesize_json<R: Rng + ?Sized>(rng: &mut R) -> String {
    Value::Object(random_object(rng)).to_string()
}

/// Like [`synthesize_json`], but drops trailing properties until the text
/// fits in `max_len` characters. `{}` is the smallest result.
pub fn synthesize_json_within<R: Rng + ?Sized>(rng: &mut R, max_len: usize) -> String {
    let mut object = random_object(rng);
    loop {
        let text = Value::Object(object.clone()).to_string();
        if text.chars().count() <= max_len {
            return text;
        }
        match object.keys().next_back().cloned() {
            Some(key) => {
                object.remove(&key);
            }
            None => return text,
        }
    }
}

fn random_object<R: Rng + ?Sized>(rng: &mut R) -> Map<String, Value> {
    let properties = rng.random_range(MIN_PROPERTIES..=MAX_PROPERTIES);
    let mut object = Map::new();

    while object.len() < properties {
        let key = format!("k{}", rng.random_range(0..KEY_SPACE));
        if object.contains_key(&key) {
            continue;
        }
        let value = random_json_value(rng);
        object.insert(key, value);
    }

    object
}

fn random_json_value<R: Rng + ?Sized>(rng: &mut R) -> Value {
    match rng.random_range(0..5) {
        0 => {
            let len = rng.random_range(1..=8);
            Value::String(random_string(rng, len))
        }
        1 => Value::from(rng.random_range(-1000_i64..=1000)),
        2 => Number::from_f64(rng.random::<f64>())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        3 => Value::Bool(rng.random_bool(0.5)),
        _ => {
            let len = rng.random_range(1..=3);
            Value::Array(
                (0..len)
                    .map(|_| Value::from(rng.random_range(0_i64..100)))
                    .collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn produces_valid_objects_with_three_to_seven_keys() {
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..200 {
            let text = synthesize_json(&mut rng);
            let parsed: Value = serde_json::from_str(&text).expect("valid json");
            let object = parsed.as_object().expect("json object");
            assert!((MIN_PROPERTIES..=MAX_PROPERTIES).contains(&object.len()));
            for (key, value) in object {
                assert!(key.starts_with('k'));
                assert!(!value.is_object());
                if let Some(items) = value.as_array() {
                    assert!((1..=3).contains(&items.len()));
                    assert!(items.iter().all(|item| item.as_i64().is_some()));
                }
            }
        }
    }

    #[test]
    fn bounded_documents_fit_the_column() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..200 {
            let text = synthesize_json_within(&mut rng, 50);
            assert!(text.chars().count() <= 50, "{text}");
            let parsed: Value = serde_json::from_str(&text).expect("valid json");
            assert!(parsed.is_object());
        }
    }

    #[test]
    fn tiny_bound_degrades_to_empty_object() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(synthesize_json_within(&mut rng, 2), "{}");
    }

    #[test]
    fn generous_bound_keeps_every_property() {
        let mut a = ChaCha8Rng::seed_from_u64(8);
        let mut b = ChaCha8Rng::seed_from_u64(8);
        assert_eq!(synthesize_json_within(&mut a, 4000), synthesize_json(&mut b));
    }

    #[test]
    fn deterministic_for_seed() {
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(synthesize_json(&mut a), synthesize_json(&mut b));
    }
}
