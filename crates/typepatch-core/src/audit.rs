//! Annotation auditing: which functions are typed but never check their types.
//!
//! A function is *suspect* when one of its positional-or-keyword parameters
//! carries an annotation and no call anywhere in its definition matches a
//! registered [`CheckMatcher`] against one of those parameters.
//!
//! Matching is deliberately narrow. With the built-in registry only
//! `isinstance(<param>, ...)` counts: a check through another argument
//! position, a keyword, an attribute call, or an alias of the parameter is not
//! recognized and the function stays suspect. Wider policies are opt-in by
//! registering more matchers.
//!
//! "Anywhere in its definition" means the `def` statement itself: parameter
//! defaults, the body and nested scopes. Calls in decorators above the `def`
//! are not part of the record, so `@check(a)` never clears a function.

use std::collections::HashSet;

use tracing::debug;

use crate::function::{CallSite, Callee, FunctionRecord};

/// One recognized shape of runtime type check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckMatcher {
    /// `name(param, ...)` with the parameter as first positional argument.
    Call { name: String },
    /// `name(..., keyword=param)`.
    Keyword { name: String, keyword: String },
    /// `object.attr(param, ...)` with the parameter as first positional argument.
    Attribute { object: String, attr: String },
}

impl CheckMatcher {
    pub fn call(name: impl Into<String>) -> Self {
        Self::Call { name: name.into() }
    }

    pub fn keyword(name: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self::Keyword {
            name: name.into(),
            keyword: keyword.into(),
        }
    }

    pub fn attribute(object: impl Into<String>, attr: impl Into<String>) -> Self {
        Self::Attribute {
            object: object.into(),
            attr: attr.into(),
        }
    }

    /// Whether `call` is this check applied to one of `params`.
    pub fn matches(&self, call: &CallSite, params: &HashSet<&str>) -> bool {
        let first_is_param = || {
            call.positional
                .first()
                .and_then(|a| a.as_name())
                .is_some_and(|n| params.contains(n))
        };
        match (self, &call.callee) {
            (Self::Call { name }, Callee::Name(callee)) => callee == name && first_is_param(),
            (Self::Keyword { name, keyword }, Callee::Name(callee)) => {
                callee == name
                    && call.keywords.iter().any(|kw| {
                        kw.name == *keyword
                            && kw.value.as_name().is_some_and(|n| params.contains(n))
                    })
            }
            (
                Self::Attribute { object, attr },
                Callee::Attribute {
                    object: callee_object,
                    attr: callee_attr,
                },
            ) => callee_object == object && callee_attr == attr && first_is_param(),
            _ => false,
        }
    }
}

/// Audit outcome for one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No audited parameter is annotated.
    NoAnnotations,
    /// Annotated, and a recognized check already guards a parameter.
    AlreadyChecked,
    /// Annotated with no recognized check: needs patching.
    Suspect,
}

impl Verdict {
    pub fn is_suspect(&self) -> bool {
        matches!(self, Self::Suspect)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAnnotations => "no-annotations",
            Self::AlreadyChecked => "already-checked",
            Self::Suspect => "suspect",
        }
    }
}

/// True when at least one positional-or-keyword parameter is annotated.
pub fn has_typed_params(func: &FunctionRecord) -> bool {
    func.audited_params().any(|p| p.annotated)
}

/// Registry of recognized type-check shapes.
#[derive(Debug, Clone)]
pub struct CheckRegistry {
    matchers: Vec<CheckMatcher>,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl CheckRegistry {
    /// The built-in policy: `isinstance(<param>, ...)` only.
    pub fn builtin() -> Self {
        Self {
            matchers: vec![CheckMatcher::call("isinstance")],
        }
    }

    pub fn empty() -> Self {
        Self {
            matchers: Vec::new(),
        }
    }

    pub fn with(mut self, matcher: CheckMatcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn matchers(&self) -> &[CheckMatcher] {
        &self.matchers
    }

    /// First call in `func` that is a registered check on one of its audited parameters.
    pub fn find_type_check<'f>(&self, func: &'f FunctionRecord) -> Option<&'f CallSite> {
        let params: HashSet<&str> = func.audited_params().map(|p| p.name.as_str()).collect();
        func.calls
            .iter()
            .find(|call| self.matchers.iter().any(|m| m.matches(call, &params)))
    }

    pub fn has_type_check(&self, func: &FunctionRecord) -> bool {
        self.find_type_check(func).is_some()
    }

    pub fn verdict(&self, func: &FunctionRecord) -> Verdict {
        if !has_typed_params(func) {
            debug!(
                function = %func.name,
                line = func.span.start,
                verdict = Verdict::NoAnnotations.as_str(),
                "audited"
            );
            return Verdict::NoAnnotations;
        }
        match self.find_type_check(func) {
            Some(check) => {
                debug!(
                    function = %func.name,
                    line = func.span.start,
                    check_line = check.line,
                    verdict = Verdict::AlreadyChecked.as_str(),
                    "audited"
                );
                Verdict::AlreadyChecked
            }
            None => {
                debug!(
                    function = %func.name,
                    line = func.span.start,
                    verdict = Verdict::Suspect.as_str(),
                    "audited"
                );
                Verdict::Suspect
            }
        }
    }
}
