//! Serde support: a [Dtype] is written as its canonical token (`"uintle32"`, `"se"`)
//! and a [Family] as its long name, so either can sit in a host application's config.

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::{
    dtype::{Dtype, Family},
    registry::Registry,
};

impl Serialize for Dtype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Dtype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(de::Error::custom)
    }
}

impl Serialize for Family {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Family {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Registry::global()
            .get(&name.to_ascii_lowercase())
            .map(|def| def.family)
            .ok_or_else(|| de::Error::custom(format!("unknown dtype family '{name}'")))
    }
}
