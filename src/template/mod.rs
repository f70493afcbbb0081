//! Branch name templates: tokenization, validation and resolution.

mod tokenizer;

mod validator;
pub(crate) use validator::{validate_template, Validation};

mod resolver;
pub(crate) use resolver::{resolve_branch_name, Sanitization};
