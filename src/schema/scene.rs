use rustc_hash::FxHashMap;

/// One scene of a screenplay, reduced to lowercase word counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scene {
    pub words: FxHashMap<String, u32>,
}

impl Scene {
    /// Build a scene from an iterator of already-normalized tokens.
    pub fn from_tokens<I>(tokens: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut words: FxHashMap<String, u32> = FxHashMap::default();
        for token in tokens {
            *words.entry(token).or_default() += 1;
        }
        Self { words }
    }

    /// Returns true if the word appears at least once in this scene.
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains_key(word)
    }

    /// Number of occurrences of a word (0 if absent).
    pub fn count(&self, word: &str) -> u32 {
        self.words.get(word).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_repeated_tokens() {
        let scene = Scene::from_tokens(
            ["bob", "runs", "bob"].iter().map(|s| s.to_string()),
        );
        assert_eq!(scene.count("bob"), 2);
        assert_eq!(scene.count("runs"), 1);
        assert_eq!(scene.count("alice"), 0);
        assert!(scene.contains("runs"));
        assert!(!scene.contains("alice"));
    }

    #[test]
    fn empty_scene() {
        let scene = Scene::from_tokens(Vec::new());
        assert!(scene.is_empty());
        assert_eq!(scene, Scene::default());
    }
}
