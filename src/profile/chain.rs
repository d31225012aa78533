//! Inheritance expansion: requested profiles → ordered, deduplicated chain.
use std::collections::HashSet;

use super::{Profile, loader};
use crate::config::Config;
use crate::error::ProfileError;

/// Expand `names` and their `extends` ancestry into a base-first chain.
///
/// Each profile appears once, after every profile it extends. Profiles are
/// loaded through `config` (see [`loader::load`]).
///
/// # Errors
///
/// Propagates loader errors and returns [`ProfileError::CircularDependency`]
/// when a profile's ancestry leads back to itself.
pub fn resolve_chain<S: AsRef<str>>(
    names: &[S],
    config: &Config,
) -> Result<Vec<Profile>, ProfileError> {
    resolve_chain_with(names, |id| loader::load(id, config))
}

/// [`resolve_chain`] with a caller-supplied loader.
///
/// # Errors
///
/// Same as [`resolve_chain`].
pub fn resolve_chain_with<S, F>(names: &[S], load: F) -> Result<Vec<Profile>, ProfileError>
where
    S: AsRef<str>,
    F: FnMut(&str) -> Result<Profile, ProfileError>,
{
    let mut resolver = ChainResolver {
        load,
        resolved: Vec::new(),
        done: HashSet::new(),
        stack: Vec::new(),
    };
    for name in names {
        resolver.visit(name.as_ref())?;
    }
    Ok(resolver.resolved)
}

struct ChainResolver<F> {
    load: F,
    resolved: Vec<Profile>,
    /// Identifiers and names of fully resolved profiles.
    done: HashSet<String>,
    /// Names of profiles whose ancestry is being expanded, outermost first.
    stack: Vec<String>,
}

impl<F> ChainResolver<F>
where
    F: FnMut(&str) -> Result<Profile, ProfileError>,
{
    fn visit(&mut self, id: &str) -> Result<(), ProfileError> {
        if self.done.contains(id) {
            return Ok(());
        }
        self.check_cycle(id)?;

        let profile = (self.load)(id)?;
        if self.done.contains(&profile.name) {
            self.done.insert(id.to_string());
            return Ok(());
        }
        self.check_cycle(&profile.name)?;

        self.stack.push(profile.name.clone());
        for parent in &profile.extends {
            self.visit(parent)?;
        }
        self.stack.pop();

        tracing::debug!("resolved profile '{}'", profile.name);
        self.done.insert(id.to_string());
        self.done.insert(profile.name.clone());
        self.resolved.push(profile);
        Ok(())
    }

    fn check_cycle(&self, name: &str) -> Result<(), ProfileError> {
        let Some(start) = self.stack.iter().position(|n| n == name) else {
            return Ok(());
        };
        let mut cycle: Vec<&str> = self
            .stack
            .iter()
            .skip(start)
            .map(String::as_str)
            .collect();
        cycle.push(name);
        Err(ProfileError::CircularDependency(cycle.join(" → ")))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn graph(edges: &[(&str, &[&str])]) -> HashMap<String, Vec<String>> {
        edges
            .iter()
            .map(|(name, parents)| {
                (
                    (*name).to_string(),
                    parents.iter().map(|p| (*p).to_string()).collect(),
                )
            })
            .collect()
    }

    fn loader_for(
        graph: &HashMap<String, Vec<String>>,
    ) -> impl FnMut(&str) -> Result<Profile, ProfileError> + '_ {
        move |id| {
            let parents = graph
                .get(id)
                .ok_or_else(|| ProfileError::NotFound(id.to_string()))?;
            let mut p = Profile::minimal(&Path::new("/profiles").join(id));
            p.extends.clone_from(parents);
            Ok(p)
        }
    }

    fn names(chain: &[Profile]) -> Vec<&str> {
        chain.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn shared_base_appears_once_first() {
        let g = graph(&[("base", &[]), ("a", &["base"]), ("b", &["base"])]);
        let chain = resolve_chain_with(&["a", "b"], loader_for(&g)).unwrap();
        assert_eq!(names(&chain), vec!["base", "a", "b"]);
    }

    #[test]
    fn requested_base_after_child_is_not_repeated() {
        let g = graph(&[("base", &[]), ("a", &["base"])]);
        let chain = resolve_chain_with(&["a", "base"], loader_for(&g)).unwrap();
        assert_eq!(names(&chain), vec!["base", "a"]);
    }

    #[test]
    fn diamond_resolves_parents_in_declared_order() {
        let g = graph(&[
            ("root", &[]),
            ("left", &["root"]),
            ("right", &["root"]),
            ("leaf", &["left", "right"]),
        ]);
        let chain = resolve_chain_with(&["leaf"], loader_for(&g)).unwrap();
        assert_eq!(names(&chain), vec!["root", "left", "right", "leaf"]);
    }

    #[test]
    fn cycle_is_reported_with_path() {
        let g = graph(&[("a", &["b"]), ("b", &["a"])]);
        let err = resolve_chain_with(&["a"], loader_for(&g)).unwrap_err();
        assert!(
            matches!(err, ProfileError::CircularDependency(ref path) if path == "a → b → a"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn self_extension_is_a_cycle() {
        let g = graph(&[("a", &["a"])]);
        let err = resolve_chain_with(&["a"], loader_for(&g)).unwrap_err();
        assert!(matches!(err, ProfileError::CircularDependency(_)));
    }

    #[test]
    fn missing_parent_propagates_not_found() {
        let g = graph(&[("a", &["ghost"])]);
        let err = resolve_chain_with(&["a"], loader_for(&g)).unwrap_err();
        assert!(matches!(err, ProfileError::NotFound(name) if name == "ghost"));
    }

    #[test]
    fn resolves_through_config_profiles_dir() {
        let dir = tempfile::tempdir().unwrap();
        for (name, manifest) in [
            ("base", "[profile]\nname = \"base\"\n"),
            ("python", "[profile]\nname = \"python\"\nextends = \"base\"\n"),
        ] {
            std::fs::create_dir_all(dir.path().join(name)).unwrap();
            std::fs::write(dir.path().join(name).join("profile.toml"), manifest).unwrap();
        }
        let config = Config {
            profiles_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let chain = resolve_chain(&["python"], &config).unwrap();
        assert_eq!(names(&chain), vec!["base", "python"]);
    }

    /// Random DAG: profile `pN` may only extend profiles with a lower index.
    fn arb_dag() -> impl Strategy<Value = (HashMap<String, Vec<String>>, Vec<String>)> {
        (1usize..8)
            .prop_flat_map(|n| {
                let parents = (0..n)
                    .map(|i| proptest::collection::vec(0..i.max(1), 0..=i.min(3)))
                    .collect::<Vec<_>>();
                (parents, proptest::collection::vec(0..n, 1..4))
            })
            .prop_map(|(parents, requested)| {
                let graph = parents
                    .into_iter()
                    .enumerate()
                    .map(|(i, ps)| {
                        let ps = ps
                            .into_iter()
                            .filter(|p| *p < i)
                            .map(|p| format!("p{p}"))
                            .collect();
                        (format!("p{i}"), ps)
                    })
                    .collect();
                let requested = requested.into_iter().map(|r| format!("p{r}")).collect();
                (graph, requested)
            })
    }

    proptest! {
        #[test]
        fn chain_is_unique_and_base_first((g, requested) in arb_dag()) {
            let chain = resolve_chain_with(&requested, loader_for(&g)).unwrap();
            let order = names(&chain);

            let unique: HashSet<_> = order.iter().collect();
            prop_assert_eq!(unique.len(), order.len());

            for (pos, profile) in chain.iter().enumerate() {
                for parent in &profile.extends {
                    let parent_pos = order.iter().position(|n| n == parent);
                    prop_assert!(parent_pos.is_some_and(|p| p < pos));
                }
            }
            for name in &requested {
                prop_assert!(order.contains(&name.as_str()));
            }
        }
    }
}
