use vergen::{BuildBuilder, CargoBuilder, Emitter};
use vergen_git2::Git2Builder;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let build = BuildBuilder::default().build_date(true).build()?;
    let cargo = CargoBuilder::default().target_triple(true).build()?;

    // Source tarballs have no git metadata; the version string still needs a describe.
    let git2 = Git2Builder::default()
        .describe(true, true, None)
        .sha(true)
        .build();

    let mut emitter = Emitter::default();
    emitter.add_instructions(&build)?.add_instructions(&cargo)?;
    match git2 {
        Ok(git2) => {
            emitter.add_instructions(&git2)?;
        }
        Err(_) => {
            println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
            println!("cargo:rustc-env=VERGEN_GIT_SHA=unknown");
        }
    }
    emitter.emit()?;
    Ok(())
}
