use thiserror::Error;

/// Fatal configuration errors from the startup build pass.
///
/// Every variant can only arise from a bug in the block definition table
/// itself, never from external input, so callers abort rather than recover.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("property `{name}` has {count} values; the maximum is {max}")]
    TooManyPropertyValues { name: String, count: usize, max: usize },

    #[error("property `{name}` does not fit the {max}-byte tape")]
    TapeOverflow { name: String, max: usize },

    #[error("property `{name}`: value `{value}` matches no canonical option")]
    UnresolvedRemap { name: String, value: String },

    #[error("property `{name}`: semantic code {code} does not fit in 7 bits")]
    CodeOutOfRange { name: String, code: i32 },

    #[error("property key `{key}` registered twice")]
    DuplicateProperty { key: String },

    #[error("unknown property `{name}` referenced by block `{block}`")]
    UnknownProperty { block: String, name: String },

    #[error("block `{block}`: default `{value}` is not a value of property `{property}`")]
    UnknownDefaultValue { block: String, property: String, value: String },

    #[error("block `{block}` carries more than {max} properties")]
    TooManyProperties { block: String, max: usize },

    #[error("block `{block}` carries more than {max} behaviours")]
    TooManyBehaviours { block: String, max: usize },

    #[error("block `{block}` defined twice")]
    DuplicateBlock { block: String },

    #[error("model box {index} has no volume; zero-area boxes stall the cover sweep")]
    DegenerateModelBox { index: usize },

    #[error("{count} block states exceed the table capacity {max}")]
    StateCapacityExceeded { count: usize, max: usize },

    #[error("packed state width mismatch: table declares {declared} bits, {count} states need {actual}")]
    StateBitsMismatch { declared: u32, actual: u32, count: usize },

    #[error("tag `{tag}` references unknown block `{member}`")]
    UnknownTagMember { tag: String, member: String },

    #[error("block table is not valid TOML: {0}")]
    BadTable(#[from] toml::de::Error),
}
