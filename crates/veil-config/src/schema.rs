use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::VeilConfig;

/// JSON schema for `veil.toml`, for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    let mut schema = schema_for!(VeilConfig);
    if let Some(metadata) = schema.schema.metadata.as_mut() {
        metadata.title = Some("veil.toml".to_owned());
    }
    schema
}
