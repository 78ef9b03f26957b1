use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use crate::{codegen::write_commands, error::DriverError, translate, TraceOptions};

const SOURCE_EXTENSION: &str = "jack";

fn is_source(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> DriverError + '_ {
    move |source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Expands `path` into the source files to compile: the file itself, or every
/// `.jack` file directly inside a directory, sorted by name.
pub fn sources(path: &Path) -> Result<Vec<PathBuf>, DriverError> {
    if is_source(path) {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(DriverError::UnsupportedPath(path.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_error(path))? {
        let entry = entry.map_err(io_error(path))?;
        let file = entry.path();
        if is_source(&file) {
            files.push(file);
        }
    }
    if files.is_empty() {
        return Err(DriverError::NoSources(path.to_path_buf()));
    }
    files.sort();

    Ok(files)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}"))
}

fn write_text(path: PathBuf, text: &str) -> Result<PathBuf, DriverError> {
    fs::write(&path, text).map_err(io_error(&path))?;
    Ok(path)
}

/// Compiles one source file and writes `<Name>.vm` next to it, plus
/// `<Name>T.xml` and `<Name>.xml` when the traces are requested. Nothing is
/// written when translation fails.
pub fn compile_file(path: &Path, options: &TraceOptions) -> Result<Vec<PathBuf>, DriverError> {
    log::info!("compiling {}", path.display());
    let source = fs::read_to_string(path).map_err(io_error(path))?;
    let translation = translate(&source, *options).map_err(|source| DriverError::Compile {
        path: path.to_path_buf(),
        source,
    })?;

    let vm_path = sibling(path, ".vm");
    let file = File::create(&vm_path).map_err(io_error(&vm_path))?;
    let mut out = BufWriter::new(file);
    write_commands(&mut out, &translation.commands).map_err(io_error(&vm_path))?;

    let mut written = vec![vm_path];
    if let Some(xml) = &translation.tokens_xml {
        written.push(write_text(sibling(path, "T.xml"), xml)?);
    }
    if let Some(xml) = &translation.parse_tree_xml {
        written.push(write_text(sibling(path, ".xml"), xml)?);
    }

    Ok(written)
}
