use std::fs;
use std::path::{Path, PathBuf};

/// Write an executable `/bin/sh` script named `name` into `dir`.
///
/// The child runs with an empty environment (no `PATH`), so scripts should
/// stick to shell builtins such as `printf` and `echo`, or absolute paths.
pub fn write_stub(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("writing stub binary");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).expect("stub metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod stub binary");
    }

    path
}

/// A stub that prints its arguments and selected environment variables, one
/// per line, then exits with `code`.
pub fn echo_args_stub(dir: &Path, name: &str, code: i32) -> PathBuf {
    write_stub(
        dir,
        name,
        &format!(
            r#"for a in "$@"; do echo "arg=$a"; done
echo "env CLASSPATH=$CLASSPATH"
echo "env ZK_SERVERS=$ZK_SERVERS"
echo "env ZK_JOBNAME=$ZK_JOBNAME"
echo "env ZK_NUMNODES=$ZK_NUMNODES"
echo "env CARGO_PKG_NAME=$CARGO_PKG_NAME"
echo "to stderr" >&2
exit {code}"#
        ),
    )
}
