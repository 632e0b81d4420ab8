use vergen::{BuildBuilder, Emitter};
use vergen_git2::Git2Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_date(true).build()?;
    let mut emitter = Emitter::default();
    emitter.add_instructions(&build)?;

    // Source tarballs have no repository to describe.
    match Git2Builder::default().describe(true, true, None).build() {
        Ok(git2) => {
            emitter.add_instructions(&git2)?;
        }
        Err(_) => println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown"),
    }

    emitter.emit()?;
    Ok(())
}
