use clap::{Parser, ValueEnum};
use solar_mach::ephem::catalog::{BODY_CATALOG, BodyKind};

/// List the bodies Solar-MACH knows by name.
#[derive(Parser, Debug)]
#[command(author, version, about = "List catalog bodies, their aliases and Horizons ids")]
struct Cli {
    /// Only list one kind of body
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum KindArg {
    Planet,
    Spacecraft,
}

impl KindArg {
    fn matches(self, kind: BodyKind) -> bool {
        matches!(
            (self, kind),
            (Self::Planet, BodyKind::Planet) | (Self::Spacecraft, BodyKind::Spacecraft)
        )
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    println!("{:<14} {:<11} {:>8}  aliases", "name", "kind", "horizons");
    for body in BODY_CATALOG
        .iter()
        .filter(|body| cli.kind.is_none_or(|kind| kind.matches(body.kind)))
    {
        println!(
            "{:<14} {:<11} {:>8}  {}",
            body.name,
            body.kind.label(),
            body.horizons_id,
            body.aliases.join(", ")
        );
    }
    Ok(())
}
