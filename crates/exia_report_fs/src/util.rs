use globset::{Glob, GlobMatcher};
use regex::Regex;

use crate::spec::{CollectError, EnumCollectPatternMode};

////////////////////////////////////////////////////////////////////////////////
// #region PatternMatching

#[derive(Debug, Clone)]
pub(crate) enum TypeCollectPatternSeq {
    Literal(Vec<String>),
    Glob(Vec<GlobMatcher>),
    Regex(Vec<Regex>),
}

impl TypeCollectPatternSeq {
    fn is_match(&self, value: &str) -> bool {
        match self {
            Self::Literal(v) => v.iter().any(|p| value.contains(p.as_str())),
            Self::Glob(v) => v.iter().any(|p| p.is_match(value)),
            Self::Regex(v) => v.iter().any(|p| p.is_match(value)),
        }
    }
}

/// Compiled file-name filters.
#[derive(Debug, Clone, Default)]
pub(crate) struct SpecCollectPatterns {
    patterns_include_files: Option<TypeCollectPatternSeq>,
    patterns_exclude_files: Option<TypeCollectPatternSeq>,
}

impl SpecCollectPatterns {
    pub(crate) fn from_raw(
        patterns_include_files: Option<&[String]>,
        patterns_exclude_files: Option<&[String]>,
        rule_pattern: EnumCollectPatternMode,
    ) -> Result<Self, CollectError> {
        Ok(Self {
            patterns_include_files: compile_patterns(patterns_include_files, rule_pattern)?,
            patterns_exclude_files: compile_patterns(patterns_exclude_files, rule_pattern)?,
        })
    }

    /// `true` when the name fails the include list or hits the exclude list.
    pub(crate) fn should_exclude(&self, name: &str) -> bool {
        let if_included = self
            .patterns_include_files
            .as_ref()
            .is_none_or(|p| p.is_match(name));
        let if_excluded = self
            .patterns_exclude_files
            .as_ref()
            .is_some_and(|p| p.is_match(name));
        !if_included || if_excluded
    }
}

fn compile_patterns(
    patterns: Option<&[String]>,
    rule_pattern: EnumCollectPatternMode,
) -> Result<Option<TypeCollectPatternSeq>, CollectError> {
    let Some(patterns) = patterns.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };

    let seq = match rule_pattern {
        EnumCollectPatternMode::Literal => TypeCollectPatternSeq::Literal(patterns.to_vec()),
        EnumCollectPatternMode::Glob => TypeCollectPatternSeq::Glob(
            patterns
                .iter()
                .map(|pattern| {
                    Glob::new(pattern)
                        .map(|glob| glob.compile_matcher())
                        .map_err(|e| CollectError::InvalidPattern(e.to_string()))
                })
                .collect::<Result<_, _>>()?,
        ),
        EnumCollectPatternMode::Regex => TypeCollectPatternSeq::Regex(
            patterns
                .iter()
                .map(|pattern| {
                    Regex::new(pattern).map_err(|e| CollectError::InvalidPattern(e.to_string()))
                })
                .collect::<Result<_, _>>()?,
        ),
    };
    Ok(Some(seq))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
