//! Value commands: `get`, `put`, `rm`, `ls`, `stat`.

use super::{output_error, write_json};
use crate::cli::{GetArgs, LsArgs, PutArgs, RmArgs, StatArgs};
use crate::error::{Result, StoreError};
use crate::storage::Storage;
use std::io::{self, Read, Write};

pub(super) fn cmd_get(storage: &Storage, args: GetArgs, out: &mut dyn Write) -> Result<()> {
    let value = storage.values.load(&args.key)?;
    out.write_all(&value).map_err(output_error)?;
    out.flush().map_err(output_error)
}

pub(super) fn cmd_put(storage: &Storage, args: PutArgs, out: &mut dyn Write) -> Result<()> {
    let value = match (args.file, args.value) {
        (Some(path), _) => std::fs::read(&path).map_err(|e| {
            StoreError::UserError(format!("failed to read '{}': {}", path.display(), e))
        })?,
        (None, Some(value)) => value.into_bytes(),
        (None, None) => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| StoreError::UserError(format!("failed to read stdin: {}", e)))?;
            buf
        }
    };

    storage.values.store(&args.key, &value)?;
    writeln!(out, "Stored {} bytes at '{}'.", value.len(), args.key).map_err(output_error)
}

pub(super) fn cmd_rm(storage: &Storage, args: RmArgs, out: &mut dyn Write) -> Result<()> {
    storage.values.delete(&args.key)?;
    writeln!(out, "Deleted '{}'.", args.key).map_err(output_error)
}

pub(super) fn cmd_ls(storage: &Storage, args: LsArgs, out: &mut dyn Write) -> Result<()> {
    for key in storage.values.list(&args.prefix, args.recursive)? {
        writeln!(out, "{}", key).map_err(output_error)?;
    }
    Ok(())
}

pub(super) fn cmd_stat(storage: &Storage, args: StatArgs, out: &mut dyn Write) -> Result<()> {
    let info = storage.values.stat(&args.key)?;

    if args.json {
        return write_json(out, &info);
    }

    writeln!(out, "Key:        {}", info.key).map_err(output_error)?;
    writeln!(out, "Size:       {} bytes", info.size).map_err(output_error)?;
    writeln!(
        out,
        "Modified:   {}",
        info.modified.format("%Y-%m-%d %H:%M:%S UTC")
    )
    .map_err(output_error)?;
    writeln!(out, "Path:       {}", storage.keys.resource_path(&args.key)).map_err(output_error)
}
