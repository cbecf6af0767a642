use vergen::{BuildBuilder, Emitter};
use vergen_git2::Git2Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_date(true).build()?;

    // Source tarballs have no git metadata; fall back to placeholders.
    match Git2Builder::default().sha(true).describe(true, true, None).build() {
        Ok(git2) => {
            Emitter::default()
                .add_instructions(&build)?
                .add_instructions(&git2)?
                .emit()?;
        }
        Err(_) => {
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
            println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
            Emitter::default().add_instructions(&build)?.emit()?;
        }
    }

    Ok(())
}
