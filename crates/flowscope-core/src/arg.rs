//! The argument model: named, typed values produced and consumed by nodes.
//!
//! Data types mirror the editor's wire format: a flat enum of scalar kinds
//! plus their `Array_<X>` counterparts. Keeping the array forms as first-class
//! variants (instead of a nested element type) matches the serialized shape
//! the editor exchanges, and makes the loop promotion/projection rules total
//! functions over the enum.

use serde::{Deserialize, Serialize};

/// Name of the synthetic boolean produced by set-variable nodes.
pub const IS_SUCCESS: &str = "isSuccess";
/// Name of the synthetic per-iteration index exposed inside loop bodies.
pub const INDEX: &str = "INDEX";
/// Name of the built-in user id argument exposed by the Start node.
pub const SYS_USER_ID: &str = "SYS_USER_ID";

/// Value type of an argument, in the editor's wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    String,
    Integer,
    Number,
    Boolean,
    Object,
    File,
    #[serde(rename = "Array_String")]
    ArrayString,
    #[serde(rename = "Array_Integer")]
    ArrayInteger,
    #[serde(rename = "Array_Number")]
    ArrayNumber,
    #[serde(rename = "Array_Boolean")]
    ArrayBoolean,
    #[serde(rename = "Array_Object")]
    ArrayObject,
    #[serde(rename = "Array_File")]
    ArrayFile,
}

impl DataType {
    /// Returns `true` for the `Array_<X>` forms.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            DataType::ArrayString
                | DataType::ArrayInteger
                | DataType::ArrayNumber
                | DataType::ArrayBoolean
                | DataType::ArrayObject
                | DataType::ArrayFile
        )
    }

    /// The per-iteration-slice form of this type, as observed from outside a
    /// loop body: scalars promote to their `Array_<X>` form; already-array
    /// and `Object` values promote to `Array_Object`.
    pub fn promoted(&self) -> DataType {
        match self {
            DataType::String => DataType::ArrayString,
            DataType::Integer => DataType::ArrayInteger,
            DataType::Number => DataType::ArrayNumber,
            DataType::Boolean => DataType::ArrayBoolean,
            DataType::File => DataType::ArrayFile,
            DataType::Object => DataType::ArrayObject,
            _ => DataType::ArrayObject,
        }
    }

    /// Strips one array level: `Array_<X>` yields `X`. Non-array input has
    /// no element type and falls back to `Object`.
    pub fn element(&self) -> DataType {
        match self {
            DataType::ArrayString => DataType::String,
            DataType::ArrayInteger => DataType::Integer,
            DataType::ArrayNumber => DataType::Number,
            DataType::ArrayBoolean => DataType::Boolean,
            DataType::ArrayObject => DataType::Object,
            DataType::ArrayFile => DataType::File,
            _ => DataType::Object,
        }
    }
}

/// How an input argument obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindKind {
    /// Filled in by the caller at run time.
    Input,
    /// Resolved against an upstream argument via a dotted catalogue key.
    Reference,
    /// A literal value authored in the editor.
    Constant,
}

/// A named, typed value declared on a node.
///
/// The same shape serves inputs and outputs; input-only fields (`bind_kind`,
/// `bind_value`) are simply absent on outputs, and `origin_data_type` is only
/// ever set by the loop-exit promotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arg {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    /// Pre-promotion type, recorded when a loop body output is re-typed to
    /// its array form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_data_type: Option<DataType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_args: Vec<Arg>,
    #[serde(default)]
    pub system_variable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_kind: Option<BindKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Arg {
    /// Creates a plain named argument of the given type.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Arg {
            name: name.into(),
            data_type: Some(data_type),
            origin_data_type: None,
            sub_args: Vec::new(),
            system_variable: false,
            bind_kind: None,
            bind_value: None,
            description: None,
        }
    }

    /// Creates an argument with no declared type.
    pub fn untyped(name: impl Into<String>) -> Self {
        Arg {
            name: name.into(),
            data_type: None,
            origin_data_type: None,
            sub_args: Vec::new(),
            system_variable: false,
            bind_kind: None,
            bind_value: None,
            description: None,
        }
    }

    /// Attaches nested sub-arguments (object fields, array element shape).
    pub fn with_sub_args(mut self, sub_args: Vec<Arg>) -> Self {
        self.sub_args = sub_args;
        self
    }

    /// Attaches a value binding.
    pub fn bound(mut self, kind: BindKind, value: impl Into<String>) -> Self {
        self.bind_kind = Some(kind);
        self.bind_value = Some(value.into());
        self
    }

    /// The synthetic `isSuccess` flag exposed by set-variable nodes.
    pub fn success_flag() -> Self {
        Arg::new(IS_SUCCESS, DataType::Boolean)
    }

    /// The synthetic `INDEX` argument exposed inside loop bodies.
    pub fn loop_index() -> Self {
        let mut arg = Arg::new(INDEX, DataType::Integer);
        arg.system_variable = true;
        arg.description = Some("index of the current element".to_string());
        arg
    }

    /// The fixed set of system arguments every Start node exposes.
    pub fn system_args() -> Vec<Arg> {
        let mut user_id = Arg::new(SYS_USER_ID, DataType::String);
        user_id.system_variable = true;
        user_id.description = Some("id of the invoking user".to_string());
        vec![user_id]
    }
}
