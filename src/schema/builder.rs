//! Schema build orchestration
//!
//! A build starts from one root file and follows imports through the
//! configured import paths. Every build produces a fresh [`SchemaModel`];
//! nothing is shared or cached between builds, so each query sees the
//! project state as it is at build time.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use async_trait::async_trait;

use crate::schema::error::BuildError;
use crate::schema::model::SchemaModel;
use crate::schema::project::BuildConfig;

#[async_trait]
pub trait SchemaBuilder: Send + Sync + 'static {
    async fn build(&self, config: &BuildConfig) -> Result<SchemaModel, BuildError>;
}

#[async_trait]
impl<B: SchemaBuilder + ?Sized> SchemaBuilder for std::sync::Arc<B> {
    async fn build(&self, config: &BuildConfig) -> Result<SchemaModel, BuildError> {
        (**self).build(config).await
    }
}

/// Builds schemas by reading files from disk.
#[derive(Debug, Default)]
pub struct FileSchemaBuilder;

impl FileSchemaBuilder {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SchemaBuilder for FileSchemaBuilder {
    async fn build(&self, config: &BuildConfig) -> Result<SchemaModel, BuildError> {
        let mut model = SchemaModel::new();
        let mut queue = VecDeque::from([config.root.clone()]);
        let mut seen: HashSet<PathBuf> = HashSet::from([config.root.clone()]);

        while let Some(path) = queue.pop_front() {
            let source = tokio::fs::read_to_string(&path)
                .await
                .map_err(|source| BuildError::Io {
                    path: path.clone(),
                    source,
                })?;
            model
                .insert_file(path.clone(), source)
                .map_err(|source| BuildError::Parse {
                    path: path.clone(),
                    source,
                })?;

            let imports: Vec<String> = model
                .file(&path)
                .map(|file| file.tree.imports.iter().map(|i| i.path.clone()).collect())
                .unwrap_or_default();

            for import in imports {
                let resolved = resolve_import(&import, &config.import_paths)
                    .ok_or_else(|| BuildError::ImportNotFound(import.clone()))?;
                if seen.insert(resolved.clone()) {
                    queue.push_back(resolved);
                }
            }
        }

        Ok(model)
    }
}

fn resolve_import(import: &str, import_paths: &[PathBuf]) -> Option<PathBuf> {
    import_paths
        .iter()
        .map(|dir| dir.join(import))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn config(root: PathBuf, dir: &TempDir) -> BuildConfig {
        BuildConfig {
            root,
            import_paths: vec![dir.path().to_path_buf()],
        }
    }

    #[tokio::test]
    async fn build_follows_imports_transitively() {
        let dir = TempDir::new().unwrap();
        let root = write_file(
            &dir,
            "root.proto",
            "import \"a.proto\";\nmessage Root { A a = 1; }",
        );
        write_file(&dir, "a.proto", "import \"b.proto\";\nmessage A { B b = 1; }");
        write_file(&dir, "b.proto", "message B {}");

        let model = FileSchemaBuilder::new()
            .build(&config(root, &dir))
            .await
            .unwrap();

        assert_eq!(model.files.len(), 3);
        assert!(model.types.contains_key("Root"));
        assert!(model.types.contains_key("A"));
        assert!(model.types.contains_key("B"));
    }

    #[tokio::test]
    async fn build_handles_import_cycles() {
        let dir = TempDir::new().unwrap();
        let root = write_file(&dir, "x.proto", "import \"y.proto\";\nmessage X {}");
        write_file(&dir, "y.proto", "import \"x.proto\";\nmessage Y {}");

        let model = FileSchemaBuilder::new()
            .build(&config(root, &dir))
            .await
            .unwrap();

        assert_eq!(model.files.len(), 2);
    }

    #[tokio::test]
    async fn missing_import_fails_the_build() {
        let dir = TempDir::new().unwrap();
        let root = write_file(&dir, "root.proto", "import \"nope.proto\";");

        let err = FileSchemaBuilder::new()
            .build(&config(root, &dir))
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::ImportNotFound(path) if path == "nope.proto"));
    }

    #[tokio::test]
    async fn malformed_file_fails_the_build() {
        let dir = TempDir::new().unwrap();
        let root = write_file(&dir, "root.proto", "message Broken {");

        let err = FileSchemaBuilder::new()
            .build(&config(root, &dir))
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Parse { .. }));
    }

    #[tokio::test]
    async fn missing_root_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("ghost.proto");

        let err = FileSchemaBuilder::new()
            .build(&config(root, &dir))
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Io { .. }));
    }
}
