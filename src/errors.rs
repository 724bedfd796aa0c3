use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PolicyError {
    #[error("Policy config `{path}` not found")]
    #[diagnostic(
        code(palisade::config_not_found),
        help("Create the policy file or point the engine at an existing one")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to read policy config `{path}`")]
    #[diagnostic(
        code(palisade::config_read),
        help("Check file permissions and encoding (the file must be UTF-8)")
    )]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("KDL parse error: {0}")]
    #[diagnostic(
        code(palisade::parse),
        help("Check your KDL file syntax — see https://kdl.dev for the specification")
    )]
    Parse(String),

    #[error("Invalid policy: {0}")]
    #[diagnostic(
        code(palisade::invalid_policy),
        help("Policy files contain `roles`, `hierarchy`, `modules` and `defaults` sections; see the crate docs for the grammar")
    )]
    InvalidPolicy(String),

    #[error("Cyclic role hierarchy detected: {0}")]
    #[diagnostic(
        code(palisade::cyclic_hierarchy),
        help("Check the `inherits` lists in your hierarchy section for circular references")
    )]
    CyclicHierarchy(String),

    #[error("Permission denied: {permission}")]
    #[diagnostic(code(palisade::forbidden))]
    Forbidden { permission: String },

    #[error("I/O error: {0}")]
    #[diagnostic(code(palisade::io))]
    Io(#[from] std::io::Error),
}
