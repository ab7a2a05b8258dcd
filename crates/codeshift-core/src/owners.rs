//! Ownership manifest (CODEOWNERS-style) parsing and matching.
//!
//! Each non-comment line is `<pattern> <owner>...`. Patterns follow
//! gitignore rules: a leading `/` or an inner `/` anchors to the root,
//! a trailing `/` only matches directories, `*` stays within one path
//! segment and `**` crosses them. When several lines match a path the last
//! one wins, and only the first owner on that line is used for grouping.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OwnersError {
    #[error("invalid ownership pattern '{pattern}' on line {line}")]
    Pattern {
        line: usize,
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("failed to build ownership matcher")]
    Build(#[source] globset::Error),
}

/// A resolved owner, with the leading `@` removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Owner {
    /// `@org/team`
    Team(String),
    /// `@username`
    User(String),
    /// `someone@example.com`
    Email(String),
}

impl Owner {
    fn parse(token: &str) -> Option<Self> {
        if let Some(handle) = token.strip_prefix('@') {
            if handle.is_empty() {
                return None;
            }
            if handle.contains('/') {
                Some(Self::Team(handle.to_string()))
            } else {
                Some(Self::User(handle.to_string()))
            }
        } else if token.contains('@') {
            Some(Self::Email(token.to_string()))
        } else {
            None
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Team(n) | Self::User(n) | Self::Email(n) => n,
        }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Self::Team(_))
    }
}

#[derive(Debug, Clone)]
struct OwnerRule {
    pattern: String,
    owners: Vec<Owner>,
}

/// A parsed manifest, ready to answer "who owns this path".
#[derive(Debug, Clone)]
pub struct OwnersManifest {
    rules: Vec<OwnerRule>,
    matcher: GlobSet,
    /// Maps each glob in `matcher` back to its rule index.
    glob_rule: Vec<usize>,
}

impl OwnersManifest {
    pub fn parse(text: &str) -> Result<Self, OwnersError> {
        let mut rules = Vec::new();
        let mut builder = GlobSetBuilder::new();
        let mut glob_rule = Vec::new();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let Some(pattern) = tokens.next() else {
                continue;
            };
            let owners: Vec<Owner> = tokens
                .take_while(|t| !t.starts_with('#'))
                .filter_map(Owner::parse)
                .collect();

            let rule_index = rules.len();
            for glob in globs_for(pattern) {
                let compiled = GlobBuilder::new(&glob)
                    .literal_separator(true)
                    .build()
                    .map_err(|source| OwnersError::Pattern {
                        line: line_no + 1,
                        pattern: pattern.to_string(),
                        source,
                    })?;
                builder.add(compiled);
                glob_rule.push(rule_index);
            }
            rules.push(OwnerRule {
                pattern: pattern.to_string(),
                owners,
            });
        }

        Ok(Self {
            rules,
            matcher: builder.build().map_err(OwnersError::Build)?,
            glob_rule,
        })
    }

    /// All owners of the last rule matching `path`.
    pub fn owners_of(&self, path: &str) -> &[Owner] {
        let normalized = path.trim_start_matches("./").trim_start_matches('/');
        self.matcher
            .matches(normalized)
            .into_iter()
            .map(|glob| self.glob_rule[glob])
            .max()
            .map(|rule| self.rules[rule].owners.as_slice())
            .unwrap_or(&[])
    }

    /// The owner used for grouping: the first owner of the winning rule.
    pub fn owner_of(&self, path: &str) -> Option<&Owner> {
        self.owners_of(path).first()
    }

    /// The pattern of the rule that decides `path`, if any.
    pub fn matching_pattern(&self, path: &str) -> Option<&str> {
        let normalized = path.trim_start_matches("./").trim_start_matches('/');
        self.matcher
            .matches(normalized)
            .into_iter()
            .map(|glob| self.glob_rule[glob])
            .max()
            .map(|rule| self.rules[rule].pattern.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Translate one gitignore-style pattern into equivalent globs.
fn globs_for(pattern: &str) -> Vec<String> {
    let anchored = pattern.starts_with('/');
    let trimmed = pattern.trim_start_matches('/');
    let dir_only = trimmed.ends_with('/');
    let body = trimmed.trim_end_matches('/');

    if body.is_empty() {
        return vec!["**".to_string()];
    }

    let rooted = anchored || body.contains('/');
    let base = if rooted || body.starts_with("**") {
        body.to_string()
    } else {
        format!("**/{}", body)
    };

    let mut globs = vec![format!("{}/**", base)];
    if !dir_only {
        globs.push(base);
    }
    globs
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
# global fallback
*                   @acme/platform
*.rs                @acme/rust-guild @carol
/docs/              @dave
src/infra/          @acme/infra   # trailing comment
src/infra/legacy.rs ops@example.com
/unowned/
";

    #[test]
    fn parses_owner_kinds() {
        assert_eq!(Owner::parse("@acme/infra"), Some(Owner::Team("acme/infra".into())));
        assert_eq!(Owner::parse("@carol"), Some(Owner::User("carol".into())));
        assert_eq!(Owner::parse("a@b.c"), Some(Owner::Email("a@b.c".into())));
        assert_eq!(Owner::parse("plain"), None);
        assert_eq!(Owner::parse("@"), None);
    }

    #[test]
    fn last_matching_rule_wins() {
        let m = OwnersManifest::parse(MANIFEST).unwrap();
        assert_eq!(m.len(), 6);

        assert_eq!(
            m.owner_of("README.md"),
            Some(&Owner::Team("acme/platform".into()))
        );
        assert_eq!(
            m.owner_of("src/lib.rs"),
            Some(&Owner::Team("acme/rust-guild".into()))
        );
        assert_eq!(m.owners_of("src/lib.rs").len(), 2);
        assert_eq!(m.owner_of("docs/guide/intro.md"), Some(&Owner::User("dave".into())));
        assert_eq!(
            m.owner_of("./src/infra/deploy.rs"),
            Some(&Owner::Team("acme/infra".into()))
        );
        assert_eq!(
            m.owner_of("src/infra/legacy.rs"),
            Some(&Owner::Email("ops@example.com".into()))
        );
    }

    #[test]
    fn rule_without_owners_clears_ownership() {
        let m = OwnersManifest::parse(MANIFEST).unwrap();
        assert_eq!(m.owner_of("unowned/file.txt"), None);
        assert_eq!(m.matching_pattern("unowned/file.txt"), Some("/unowned/"));
    }

    #[test]
    fn anchored_directory_does_not_match_nested_copy() {
        let m = OwnersManifest::parse("/docs/ @dave\n").unwrap();
        assert!(m.owner_of("docs/a.md").is_some());
        assert!(m.owner_of("src/docs/a.md").is_none());
    }

    #[test]
    fn single_star_stays_in_segment() {
        let m = OwnersManifest::parse("/src/*.rs @carol\n").unwrap();
        assert!(m.owner_of("src/lib.rs").is_some());
        assert!(m.owner_of("src/nested/lib.rs").is_none());
    }

    #[test]
    fn empty_manifest_owns_nothing() {
        let m = OwnersManifest::parse("# nothing here\n\n").unwrap();
        assert!(m.is_empty());
        assert_eq!(m.owner_of("anything"), None);
    }
}
