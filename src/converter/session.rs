//! Multi-block driver

use tracing::debug;

use super::{Config, Converted, Converter, INIT_FUNC_NAME, IdentDoc};
use crate::analysis::{Importer, ObjectRef};
use crate::errors::LgoResult;

/// Import path prefix of block packages; the block number is appended
pub const DEFAULT_PKG_PREFIX: &str = "lgo/exec/pkg";

/// Converts successive blocks, carrying each block's symbols and imports
/// into the next
pub struct Session<'a> {
    converter: Converter<'a>,
    base: Config,
    pkg_prefix: String,
    counter: usize,
    olds: Vec<ObjectRef>,
    old_imports: Vec<ObjectRef>,
}

impl<'a> Session<'a> {
    pub fn new(importer: &'a dyn Importer) -> Self {
        Self::with_config(importer, Config::default())
    }

    /// `base` supplies the prefixes and flags of every block
    pub fn with_config(importer: &'a dyn Importer, base: Config) -> Self {
        Self {
            converter: Converter::new(importer),
            base,
            pkg_prefix: DEFAULT_PKG_PREFIX.to_string(),
            counter: 0,
            olds: Vec::new(),
            old_imports: Vec::new(),
        }
    }

    pub fn with_pkg_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.pkg_prefix = prefix.into();
        self
    }

    /// Convert the next block. A failed block leaves the session as it was.
    pub fn convert(&mut self, src: &str) -> LgoResult<Converted> {
        let config = self.config();
        let converted = self.converter.convert(src, &config)?;
        self.counter += 1;

        for obj in converted.pkg.objects() {
            if obj.name == INIT_FUNC_NAME {
                continue;
            }
            self.olds.retain(|old| old.name != obj.name);
            self.olds.push(obj);
        }
        for im in &converted.imports {
            self.old_imports.retain(|old| old.name != im.name);
            self.old_imports.push(im.clone());
        }
        debug!(
            block = self.counter,
            olds = self.olds.len(),
            imports = self.old_imports.len(),
            "block committed"
        );
        Ok(converted)
    }

    /// Documentation for the identifier at `offset` of a block that would
    /// run next
    pub fn inspect(&self, src: &str, offset: usize) -> IdentDoc {
        self.converter.inspect_ident(src, offset, &self.config())
    }

    /// Symbols of every committed block, newest definition per name
    pub fn olds(&self) -> &[ObjectRef] {
        &self.olds
    }

    pub fn old_imports(&self) -> &[ObjectRef] {
        &self.old_imports
    }

    /// Number of committed blocks
    pub fn blocks(&self) -> usize {
        self.counter
    }

    fn config(&self) -> Config {
        Config {
            olds: self.olds.clone(),
            old_imports: self.old_imports.clone(),
            lgo_pkg_path: format!("{}{}", self.pkg_prefix, self.counter),
            ..self.base.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StdImporter;

    #[test]
    fn test_blocks_are_numbered() {
        let importer = StdImporter::new();
        let mut session = Session::new(&importer).with_pkg_prefix("repl/b");
        assert_eq!(session.config().lgo_pkg_path, "repl/b0");
        session.convert("x := 1").unwrap();
        assert_eq!(session.blocks(), 1);
        assert_eq!(session.config().lgo_pkg_path, "repl/b1");
    }

    #[test]
    fn test_later_definitions_replace_olds() {
        let importer = StdImporter::new();
        let mut session = Session::new(&importer);
        session.convert("import \"strings\"\nx := 1\ny := 2").unwrap();
        session.convert("x := \"s\"").unwrap();

        let names: Vec<&str> = session.olds().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["y", "x"]);
        assert_eq!(session.olds()[1].ty().to_string(), "string");
        assert_eq!(session.olds()[1].pkg().unwrap().path, "lgo/exec/pkg1");
        assert_eq!(session.old_imports().len(), 1);
        assert_eq!(session.old_imports()[0].name, "strings");
    }

    #[test]
    fn test_failed_block_is_not_committed() {
        let importer = StdImporter::new();
        let mut session = Session::new(&importer);
        assert!(session.convert("x := undefinedName").is_err());
        assert_eq!(session.blocks(), 0);
        assert!(session.olds().is_empty());
    }
}
