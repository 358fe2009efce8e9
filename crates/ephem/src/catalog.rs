//! Static registry of bodies the constellation tools know how to resolve.

/// Canonical catalog name of the Earth, used for frame alignment.
pub const EARTH: &str = "Earth";

/// Broad classification of catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Planet,
    Spacecraft,
}

impl BodyKind {
    /// Returns a human-readable label for this body kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::Planet => "planet",
            Self::Spacecraft => "spacecraft",
        }
    }
}

/// Metadata describing a body the ephemeris backends can look up.
#[derive(Debug, Clone, Copy)]
pub struct BodyDescriptor {
    /// Canonical display name.
    pub name: &'static str,
    /// Alternative spellings accepted on input.
    pub aliases: &'static [&'static str],
    /// JPL Horizons command identifier.
    pub horizons_id: &'static str,
    pub kind: BodyKind,
    /// Plot colour as RGB.
    pub color: (u8, u8, u8),
}

impl BodyDescriptor {
    /// Whether `name` refers to this body, ignoring case, spaces, dashes, and underscores.
    pub fn matches(&self, name: &str) -> bool {
        let wanted = fold_name(name);
        fold_name(self.name) == wanted || self.aliases.iter().any(|a| fold_name(a) == wanted)
    }
}

/// Canonical body set. Order is the listing order of the `bodies` binary.
pub const BODY_CATALOG: &[BodyDescriptor] = &[
    BodyDescriptor {
        name: "Mercury",
        aliases: &[],
        horizons_id: "199",
        kind: BodyKind::Planet,
        color: (0, 206, 209),
    },
    BodyDescriptor {
        name: "Venus",
        aliases: &[],
        horizons_id: "299",
        kind: BodyKind::Planet,
        color: (153, 50, 204),
    },
    BodyDescriptor {
        name: EARTH,
        aliases: &[],
        horizons_id: "399",
        kind: BodyKind::Planet,
        color: (0, 128, 0),
    },
    BodyDescriptor {
        name: "Mars",
        aliases: &[],
        horizons_id: "499",
        kind: BodyKind::Planet,
        color: (128, 0, 0),
    },
    BodyDescriptor {
        name: "Jupiter",
        aliases: &[],
        horizons_id: "599",
        kind: BodyKind::Planet,
        color: (0, 0, 128),
    },
    BodyDescriptor {
        name: "Saturn",
        aliases: &[],
        horizons_id: "699",
        kind: BodyKind::Planet,
        color: (210, 180, 140),
    },
    BodyDescriptor {
        name: "Uranus",
        aliases: &[],
        horizons_id: "799",
        kind: BodyKind::Planet,
        color: (95, 158, 160),
    },
    BodyDescriptor {
        name: "Neptune",
        aliases: &[],
        horizons_id: "899",
        kind: BodyKind::Planet,
        color: (65, 105, 225),
    },
    BodyDescriptor {
        name: "STEREO-A",
        aliases: &["STEREO A", "STA", "STEREO Ahead"],
        horizons_id: "-234",
        kind: BodyKind::Spacecraft,
        color: (255, 0, 0),
    },
    BodyDescriptor {
        name: "STEREO-B",
        aliases: &["STEREO B", "STB", "STEREO Behind"],
        horizons_id: "-235",
        kind: BodyKind::Spacecraft,
        color: (0, 0, 255),
    },
    BodyDescriptor {
        name: "SOHO",
        aliases: &[],
        horizons_id: "-21",
        kind: BodyKind::Spacecraft,
        color: (0, 100, 0),
    },
    BodyDescriptor {
        name: "Solar Orbiter",
        aliases: &["SolO", "SOLAR ORBITER"],
        horizons_id: "-144",
        kind: BodyKind::Spacecraft,
        color: (30, 144, 255),
    },
    BodyDescriptor {
        name: "PSP",
        aliases: &["Parker Solar Probe", "SPP", "Solar Probe Plus"],
        horizons_id: "-96",
        kind: BodyKind::Spacecraft,
        color: (128, 0, 128),
    },
    BodyDescriptor {
        name: "BepiColombo",
        aliases: &["Bepi", "MPO", "Bepi Colombo"],
        horizons_id: "-121",
        kind: BodyKind::Spacecraft,
        color: (255, 165, 0),
    },
    BodyDescriptor {
        name: "Wind",
        aliases: &[],
        horizons_id: "-8",
        kind: BodyKind::Spacecraft,
        color: (112, 128, 144),
    },
    BodyDescriptor {
        name: "ACE",
        aliases: &[],
        horizons_id: "-92",
        kind: BodyKind::Spacecraft,
        color: (105, 105, 105),
    },
    BodyDescriptor {
        name: "Ulysses",
        aliases: &[],
        horizons_id: "-55",
        kind: BodyKind::Spacecraft,
        color: (218, 165, 32),
    },
    BodyDescriptor {
        name: "MAVEN",
        aliases: &[],
        horizons_id: "-202",
        kind: BodyKind::Spacecraft,
        color: (165, 42, 42),
    },
    BodyDescriptor {
        name: "Mars Express",
        aliases: &["MEX"],
        horizons_id: "-41",
        kind: BodyKind::Spacecraft,
        color: (255, 140, 0),
    },
    BodyDescriptor {
        name: "Juno",
        aliases: &[],
        horizons_id: "-61",
        kind: BodyKind::Spacecraft,
        color: (255, 69, 0),
    },
    BodyDescriptor {
        name: "JUICE",
        aliases: &[],
        horizons_id: "-28",
        kind: BodyKind::Spacecraft,
        color: (199, 21, 133),
    },
];

/// Look up a catalog entry by name or alias.
pub fn lookup(name: &str) -> Option<&'static BodyDescriptor> {
    BODY_CATALOG.iter().find(|body| body.matches(name))
}

fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}
