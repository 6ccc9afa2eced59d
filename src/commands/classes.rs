use crate::cli::ClassesArgs;
use crate::motif::{MotifClass, Subclass};
use crate::utils::Result;
use std::io::Write;

/// Taxonomy rows: one per class, or one per subclass when `subclasses` is set.
pub fn taxonomy_table(subclasses: bool) -> Vec<String> {
    let classes: Vec<MotifClass> = MotifClass::PRIMARY
        .iter()
        .copied()
        .chain([MotifClass::Hybrid, MotifClass::Cluster])
        .collect();
    if !subclasses {
        return classes
            .iter()
            .map(|class| format!("{}.0\t{}", class.major_id(), class.name()))
            .collect();
    }
    let mut rows = Vec::with_capacity(Subclass::ALL.len());
    for class in classes {
        for subclass in Subclass::ALL.iter().filter(|s| s.class() == class) {
            rows.push(format!(
                "{}\t{}\t{}",
                subclass.taxonomy_code(),
                class.name(),
                subclass.name()
            ));
        }
    }
    rows
}

pub fn classes(args: ClassesArgs) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for row in taxonomy_table(args.subclasses) {
        writeln!(out, "{}", row).map_err(|e| e.to_string())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lists_every_subclass_once() {
        assert_eq!(taxonomy_table(false).len(), 10);
        let rows = taxonomy_table(true);
        assert_eq!(rows.len(), Subclass::ALL.len());
        assert!(rows.contains(&"6.2\tG-Quadruplex\tCanonical_G4".to_string()));
        assert_eq!(rows[0], "1.1\tCurved_DNA\tGlobal_Curvature");
    }
}
