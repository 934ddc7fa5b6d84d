use clap::Args as ClapArgs;

#[derive(ClapArgs, Debug, Clone)]
pub struct TextArgs {
    /// Text to classify. Repeat for a batch.
    #[clap(short, long = "query", required = true, allow_hyphen_values = true)]
    pub queries: Vec<String>,

    /// Reference sentence to match against. Repeat for several.
    /// Defaults to the intents from config.yaml.
    #[clap(short, long = "reference", allow_hyphen_values = true)]
    pub references: Vec<String>,
}

impl TextArgs {
    /// References given on the command line, if any.
    pub fn references(&self) -> Option<&[String]> {
        if self.references.is_empty() {
            None
        } else {
            Some(&self.references)
        }
    }
}
