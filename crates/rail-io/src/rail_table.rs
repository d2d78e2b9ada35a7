//! Rail profile table: a keyed table (name -> [`Rail`]) persisted as a
//! delimited text file with header, one row per profile. The loader accepts
//! either the embedded defaults (UIC60, UIC54) or a filesystem path.

use std::collections::BTreeMap;
use std::path::Path;

use rail_model::Rail;

use crate::error::{IoError, Result};

#[derive(Debug, Clone, Default)]
pub struct RailProfileTable {
    profiles: BTreeMap<String, Rail>,
}

impl RailProfileTable {
    /// The compiled-in catalog used when no external table is supplied,
    /// sourced from the reference implementation's own rail database.
    pub fn embedded() -> Self {
        let mut profiles = BTreeMap::new();
        let uic60 = Rail::uic60();
        let uic54 = Rail::uic54();
        profiles.insert(uic60.name.clone(), uic60);
        profiles.insert(uic54.name.clone(), uic54);
        RailProfileTable { profiles }
    }

    pub fn get(&self, name: &str) -> Result<&Rail> {
        self.profiles
            .get(name)
            .ok_or_else(|| IoError::UnknownProfile(name.to_string()))
    }

    pub fn insert(&mut self, rail: Rail) {
        self.profiles.insert(rail.name.clone(), rail);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Loads a rail profile table from a delimited text file with header
    /// row `name,e,g,nu,kappa,m_r,rho,eta_r,d_r,iy,iz,it,area,shear_area,volume_per_length`.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut profiles = BTreeMap::new();
        for record in reader.deserialize() {
            let row: RailRow = record?;
            profiles.insert(row.name.clone(), row.into_rail());
        }
        Ok(RailProfileTable { profiles })
    }
}

#[derive(Debug, serde::Deserialize)]
struct RailRow {
    name: String,
    e: f64,
    g: f64,
    nu: f64,
    kappa: f64,
    m_r: f64,
    rho: f64,
    eta_r: f64,
    d_r: f64,
    iy: f64,
    iz: f64,
    it: f64,
    area: f64,
    shear_area: f64,
    volume_per_length: f64,
}

impl RailRow {
    fn into_rail(self) -> Rail {
        Rail {
            name: self.name,
            e: self.e,
            g: self.g,
            nu: self.nu,
            kappa: self.kappa,
            m_r: self.m_r,
            rho: self.rho,
            eta_r: self.eta_r,
            d_r: self.d_r,
            iy: self.iy,
            iz: self.iz,
            it: self.it,
            area: self.area,
            shear_area: self.shear_area,
            volume_per_length: self.volume_per_length,
            roughness: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn embedded_table_has_uic60_and_uic54() {
        let table = RailProfileTable::embedded();
        assert!(table.get("UIC60").is_ok());
        assert!(table.get("UIC54").is_ok());
        assert_eq!(table.get("UIC60").unwrap().m_r, 60.2);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let table = RailProfileTable::embedded();
        assert!(table.get("NORDBORG").is_err());
    }

    #[test]
    fn loads_from_delimited_file() {
        let path = unique_temp_file("rail_table_load");
        let mut f = std::fs::File::create(&path).expect("create fixture");
        writeln!(
            f,
            "name,e,g,nu,kappa,m_r,rho,eta_r,d_r,iy,iz,it,area,shear_area,volume_per_length"
        )
        .unwrap();
        writeln!(
            f,
            "NORDBORG,2.1e11,8.1e10,0.3,0.4,54.5,7850,0.01,1000,2.4e-5,4.3e-6,1.8e-6,7.0e-3,0.6,6.9e-3"
        )
        .unwrap();
        drop(f);

        let table = RailProfileTable::load_path(&path).expect("table should load");
        let rail = table.get("NORDBORG").expect("profile should be present");
        assert_eq!(rail.m_r, 54.5);
        let _ = std::fs::remove_file(&path);
    }

    fn unique_temp_file(prefix: &str) -> std::path::PathBuf {
        let pid = std::process::id();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be valid")
            .as_nanos();
        std::env::temp_dir().join(format!("{prefix}_{pid}_{nanos}.csv"))
    }
}
