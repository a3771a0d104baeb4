#[macro_export]
macro_rules! value_to_string {
    ($v: expr) => {
        match $v {
            serde_json::Value::String(ref s) => $crate::strategy::non_empty(s),
            _ => None,
        }
    };
    ($v: expr, $($or: expr),+ $(,)?) => {
        match $v {
            serde_json::Value::String(ref s) if !s.trim().is_empty() => $crate::strategy::non_empty(s),
            _ => $crate::value_to_string!($($or),+),
        }
    };
}
#[macro_export]
macro_rules! hdmap {
    () => {
        reqwest::header::HeaderMap::new()
    };
    ($($key: expr => $value: expr),+ $(,)?) => {
        {
            const CAP: usize = sugars::count!($($key),*);
            let mut map = reqwest::header::HeaderMap::with_capacity(CAP);
            $(map.insert($key, reqwest::header::HeaderValue::from_static($value));)+
            map
        }
    };
}

pub mod client;
pub mod html;

pub use self::client::{Client, BROWSER_HEADERS, UA};
