use std::error::Error;
use vergen::EmitBuilder;

fn main() -> Result<(), Box<dyn Error>> {
    // Builds from a source tarball have no git metadata; fall back to a fixed tag
    if EmitBuilder::builder()
        .fail_on_error()
        .all_git()
        .git_describe(true, true, None)
        .emit()
        .is_err()
    {
        println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
    }
    Ok(())
}
