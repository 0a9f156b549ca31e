mod registry;

pub use registry::{
    json_schema_array, json_schema_boolean, json_schema_integer, json_schema_number,
    json_schema_object, json_schema_string, RegistryError, Tool, ToolRegistry,
};
