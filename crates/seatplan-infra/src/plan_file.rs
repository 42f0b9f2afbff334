//! Plan JSON files

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use seatplan_domain::model::Plan;
use seatplan_types::{Error, Result};

pub fn save_plan(path: &Path, plan: &Plan) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, plan)?;
    writer.flush()?;
    Ok(())
}

pub fn load_plan(path: &Path) -> Result<Plan> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    let plan = serde_json::from_reader(BufReader::new(file))?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatplan_domain::model::{Fleet, Student};
    use seatplan_types::Strategy;
    use tempfile::tempdir;

    #[test]
    fn test_plan_survives_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("plan.json");

        let mut groups = Fleet::standard().empty_groups();
        groups[2].students.push(Student::new(1, "5", "Anna", "Lipowa 1"));
        let plan = Plan::new(Strategy::Llm, groups);

        save_plan(&path, &plan).unwrap();
        let loaded = load_plan(&path).unwrap();
        assert_eq!(loaded.strategy, Strategy::Llm);
        assert_eq!(loaded.groups, plan.groups);
        assert_eq!(loaded.created_at, plan.created_at);
    }

    #[test]
    fn test_load_missing_plan() {
        let dir = tempdir().unwrap();
        let err = load_plan(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }
}
