use rand::distributions::Alphanumeric;
use rand::Rng;

/// Source of generated names, used as a default for name inputs.
pub trait NameGenerator: Send + Sync {
    fn generate(&self, prefix: &str, suffix: &str) -> String;
}

/// `<prefix><suffix>-<six random lowercase alphanumerics>`, e.g. `lb-x3k9qa`.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomNames;

impl NameGenerator for RandomNames {
    fn generate(&self, prefix: &str, suffix: &str) -> String {
        let tag: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        format!("{}{}-{}", prefix, suffix, tag)
    }
}

/// Always the same name. Handy where output must be reproducible.
#[derive(Clone, Debug)]
pub struct FixedName(pub String);

impl NameGenerator for FixedName {
    fn generate(&self, _prefix: &str, _suffix: &str) -> String {
        self.0.clone()
    }
}

pub fn generate(prefix: &str, suffix: &str) -> String {
    RandomNames.generate(prefix, suffix)
}
