use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;

/// Structural class of a detected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MotifClass {
    CurvedDna,
    SlippedDna,
    Cruciform,
    RLoop,
    Triplex,
    GQuadruplex,
    IMotif,
    ZDna,
    Hybrid,
    Cluster,
}

impl MotifClass {
    /// Classes produced by detectors, in taxonomy order.
    pub const PRIMARY: [MotifClass; 8] = [
        MotifClass::CurvedDna,
        MotifClass::SlippedDna,
        MotifClass::Cruciform,
        MotifClass::RLoop,
        MotifClass::Triplex,
        MotifClass::GQuadruplex,
        MotifClass::IMotif,
        MotifClass::ZDna,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MotifClass::CurvedDna => "Curved_DNA",
            MotifClass::SlippedDna => "Slipped_DNA",
            MotifClass::Cruciform => "Cruciform",
            MotifClass::RLoop => "R-Loop",
            MotifClass::Triplex => "Triplex",
            MotifClass::GQuadruplex => "G-Quadruplex",
            MotifClass::IMotif => "i-Motif",
            MotifClass::ZDna => "Z-DNA",
            MotifClass::Hybrid => "Hybrid",
            MotifClass::Cluster => "Non-B_DNA_Clusters",
        }
    }

    pub fn major_id(self) -> u8 {
        match self {
            MotifClass::CurvedDna => 1,
            MotifClass::SlippedDna => 2,
            MotifClass::Cruciform => 3,
            MotifClass::RLoop => 4,
            MotifClass::Triplex => 5,
            MotifClass::GQuadruplex => 6,
            MotifClass::IMotif => 7,
            MotifClass::ZDna => 8,
            MotifClass::Hybrid => 10,
            MotifClass::Cluster => 11,
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, MotifClass::Hybrid | MotifClass::Cluster)
    }
}

impl fmt::Display for MotifClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subclass {
    GlobalCurvature,
    LocalCurvature,
    DirectRepeat,
    Str,
    InvertedRepeat,
    RLoopSite,
    MirrorRepeat,
    StickyDna,
    MultimericG4,
    CanonicalG4,
    RelaxedG4,
    BulgedG4,
    BipartiteG4,
    ImperfectG4,
    GTriplex,
    CanonicalIMotif,
    RelaxedIMotif,
    AcMotif,
    ZDna,
    Egz,
    Hybrid,
    Hotspot,
}

impl Subclass {
    pub const ALL: [Subclass; 22] = [
        Subclass::GlobalCurvature,
        Subclass::LocalCurvature,
        Subclass::DirectRepeat,
        Subclass::Str,
        Subclass::InvertedRepeat,
        Subclass::RLoopSite,
        Subclass::MirrorRepeat,
        Subclass::StickyDna,
        Subclass::MultimericG4,
        Subclass::CanonicalG4,
        Subclass::RelaxedG4,
        Subclass::BulgedG4,
        Subclass::BipartiteG4,
        Subclass::ImperfectG4,
        Subclass::GTriplex,
        Subclass::CanonicalIMotif,
        Subclass::RelaxedIMotif,
        Subclass::AcMotif,
        Subclass::ZDna,
        Subclass::Egz,
        Subclass::Hybrid,
        Subclass::Hotspot,
    ];

    pub fn class(self) -> MotifClass {
        use Subclass::*;
        match self {
            GlobalCurvature | LocalCurvature => MotifClass::CurvedDna,
            DirectRepeat | Str => MotifClass::SlippedDna,
            InvertedRepeat => MotifClass::Cruciform,
            RLoopSite => MotifClass::RLoop,
            MirrorRepeat | StickyDna => MotifClass::Triplex,
            MultimericG4 | CanonicalG4 | RelaxedG4 | BulgedG4 | BipartiteG4 | ImperfectG4
            | GTriplex => MotifClass::GQuadruplex,
            CanonicalIMotif | RelaxedIMotif | AcMotif => MotifClass::IMotif,
            ZDna | Egz => MotifClass::ZDna,
            Hybrid => MotifClass::Hybrid,
            Hotspot => MotifClass::Cluster,
        }
    }

    pub fn name(self) -> &'static str {
        use Subclass::*;
        match self {
            GlobalCurvature => "Global_Curvature",
            LocalCurvature => "Local_Curvature",
            DirectRepeat => "Direct_Repeat",
            Str => "STR",
            InvertedRepeat => "Inverted_Repeat",
            RLoopSite => "R-Loop_Formation_Site",
            MirrorRepeat => "Mirror_Repeat",
            StickyDna => "Sticky_DNA",
            MultimericG4 => "Multimeric_G4",
            CanonicalG4 => "Canonical_G4",
            RelaxedG4 => "Relaxed_G4",
            BulgedG4 => "Bulged_G4",
            BipartiteG4 => "Bipartite_G4",
            ImperfectG4 => "Imperfect_G4",
            GTriplex => "G-Triplex",
            CanonicalIMotif => "Canonical_iMotif",
            RelaxedIMotif => "Relaxed_iMotif",
            AcMotif => "AC-Motif",
            ZDna => "Z-DNA",
            Egz => "eGZ",
            Hybrid => "Hybrid",
            Hotspot => "Hotspot",
        }
    }

    pub fn minor_id(self) -> u8 {
        use Subclass::*;
        match self {
            GlobalCurvature | DirectRepeat | InvertedRepeat | RLoopSite | MirrorRepeat
            | MultimericG4 | CanonicalIMotif | ZDna | Hybrid | Hotspot => 1,
            LocalCurvature | Str | StickyDna | CanonicalG4 | RelaxedIMotif | Egz => 2,
            RelaxedG4 | AcMotif => 3,
            BulgedG4 => 4,
            BipartiteG4 => 5,
            ImperfectG4 => 6,
            GTriplex => 7,
        }
    }

    /// `major.minor` identifier, e.g. `6.2` for canonical G4.
    pub fn taxonomy_code(self) -> String {
        format!("{}.{}", self.class().major_id(), self.minor_id())
    }

    /// Tie-break rank among subclasses of one class; lower wins.
    ///
    /// G4 ranks follow experimental stability (multimeric and canonical
    /// quadruplexes first, G-triplex intermediates last).
    pub fn priority_rank(self) -> u8 {
        use Subclass::*;
        match self {
            MultimericG4 => 0,
            CanonicalG4 => 1,
            BulgedG4 => 2,
            BipartiteG4 => 3,
            RelaxedG4 => 4,
            ImperfectG4 => 5,
            GTriplex => 6,
            CanonicalIMotif => 0,
            RelaxedIMotif => 1,
            AcMotif => 2,
            ZDna => 0,
            Egz => 1,
            GlobalCurvature => 0,
            LocalCurvature => 1,
            MirrorRepeat => 0,
            StickyDna => 1,
            Str => 0,
            DirectRepeat => 1,
            InvertedRepeat | RLoopSite | Hybrid | Hotspot => 0,
        }
    }
}

impl fmt::Display for Subclass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Official naming of an internal label.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyEntry {
    pub class: MotifClass,
    pub subclass: Option<Subclass>,
    pub class_name: &'static str,
    pub subclass_name: Option<&'static str>,
    pub code: String,
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

static ALIASES: Lazy<HashMap<String, (MotifClass, Option<Subclass>)>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for class in MotifClass::PRIMARY
        .iter()
        .chain([MotifClass::Hybrid, MotifClass::Cluster].iter())
    {
        map.insert(normalize_label(class.name()), (*class, None));
    }
    for subclass in Subclass::ALL {
        map.entry(normalize_label(subclass.name()))
            .or_insert((subclass.class(), Some(subclass)));
    }
    let extra: [(&str, MotifClass, Option<Subclass>); 14] = [
        ("g4", MotifClass::GQuadruplex, None),
        ("quadruplex", MotifClass::GQuadruplex, None),
        ("imotif", MotifClass::IMotif, None),
        ("zdna", MotifClass::ZDna, None),
        ("curved", MotifClass::CurvedDna, None),
        ("slipped", MotifClass::SlippedDna, None),
        ("rloop", MotifClass::RLoop, None),
        ("hdna", MotifClass::Triplex, None),
        ("cluster", MotifClass::Cluster, None),
        ("hotspot", MotifClass::Cluster, Some(Subclass::Hotspot)),
        ("tandemrepeat", MotifClass::SlippedDna, Some(Subclass::Str)),
        ("invertedrepeats", MotifClass::Cruciform, Some(Subclass::InvertedRepeat)),
        ("egzmotif", MotifClass::ZDna, Some(Subclass::Egz)),
        ("gtriplexintermediate", MotifClass::GQuadruplex, Some(Subclass::GTriplex)),
    ];
    for (alias, class, subclass) in extra {
        map.insert(alias.to_string(), (class, subclass));
    }
    map
});

/// Maps an internal or user-facing label to its official name and numeric id.
///
/// Matching ignores case, `-`, `_` and spaces. Class-level labels report the
/// `major.0` code.
pub fn lookup(label: &str) -> Option<TaxonomyEntry> {
    let (class, subclass) = *ALIASES.get(&normalize_label(label))?;
    let code = match subclass {
        Some(sub) => sub.taxonomy_code(),
        None => format!("{}.0", class.major_id()),
    };
    Some(TaxonomyEntry {
        class,
        subclass,
        class_name: class.name(),
        subclass_name: subclass.map(Subclass::name),
        code,
    })
}

/// Taxonomy id of a placed motif: `<class>_<major.minor>_<start>-<end>`.
pub fn taxonomy_id(subclass: Subclass, start: usize, end: usize) -> String {
    format!(
        "{}_{}_{}-{}",
        subclass.class().name(),
        subclass.taxonomy_code(),
        start,
        end
    )
}
