use crate::data_frame::*;
use crate::error::{Error, Result};
use log::*;
use ndarray::prelude::*;
use std::path::{Path, PathBuf};

/// A genotype dataset the model can derive partitions from.
pub trait Dataset {
    /// Reads samples into memory. Calling it on a loaded dataset is a no-op.
    fn load(&mut self) -> Result<()>;

    /// Zero until the dataset is loaded
    fn num_samples(&self) -> usize;

    /// Numeric population code per sample
    fn populations(&self) -> Labels;

    /// `[samples, loci]` allele dosages, missing calls are NaN
    fn genotypes(&self) -> ArrayView2<'_, V>;
}

/// Dataset backed by a csv file with a header row and the columns
/// `sample,population,<locus>...`.
///
/// Population names are coded as `0.0, 1.0, ...` in order of first appearance.
#[derive(Clone, Debug, Default)]
pub struct GenotypeDataset {
    path: Option<PathBuf>,
    sample_ids: Vec<String>,
    loci: Vec<String>,
    population_names: Vec<String>,
    populations: Labels,
    genotypes: DataFrame,
}

impl GenotypeDataset {
    /// Unloaded dataset reading from `path` on `load`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Already loaded, in-memory dataset
    pub fn from_parts<S: AsRef<str>>(
        sample_ids: Vec<String>,
        populations: &[S],
        genotypes: DataFrame,
    ) -> Result<Self> {
        if sample_ids.len() != populations.len() || sample_ids.len() != genotypes.nrows() {
            return Err(Error::dataset(format!(
                "{} samples, {} populations and {} genotype rows do not line up",
                sample_ids.len(),
                populations.len(),
                genotypes.nrows()
            )));
        }
        let (population_names, codes) = encode_populations(populations);
        Ok(Self {
            path: None,
            sample_ids,
            loci: (0..genotypes.ncols()).map(|j| format!("locus_{}", j)).collect(),
            population_names,
            populations: codes,
            genotypes,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn sample_ids(&self) -> &[String] {
        &self.sample_ids
    }

    pub fn loci(&self) -> &[String] {
        &self.loci
    }

    /// Name of population code `i` is `population_names()[i]`
    pub fn population_names(&self) -> &[String] {
        &self.population_names
    }

    fn read(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.len() < 3 {
            return Err(Error::dataset(format!(
                "{}: expected `sample,population` followed by at least one locus column",
                path.display()
            )));
        }

        let mut sample_ids = Vec::new();
        let mut names = Vec::new();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            sample_ids.push(record[0].to_string());
            names.push(record[1].to_string());
            rows.push(
                record
                    .iter()
                    .skip(2)
                    .map(parse_value)
                    .collect::<Result<Vec<V>>>()?,
            );
        }
        if rows.is_empty() {
            return Err(Error::dataset(format!("{} has no samples", path.display())));
        }

        let genotypes = from_rows(rows)?;
        let mut dataset = Self::from_parts(sample_ids, &names, genotypes)?;
        dataset.loci = headers.iter().skip(2).map(String::from).collect();
        dataset.path = Some(path.to_path_buf());
        Ok(dataset)
    }
}

impl Dataset for GenotypeDataset {
    fn load(&mut self) -> Result<()> {
        if self.num_samples() > 0 {
            return Ok(());
        }
        let path = self
            .path
            .clone()
            .ok_or_else(|| Error::dataset("dataset has no source file"))?;
        info!("Loading dataset {}", path.display());
        *self = Self::read(&path)?;
        info!(
            "Loaded {} samples, {} loci, {} populations",
            self.num_samples(),
            self.loci.len(),
            self.population_names.len()
        );
        Ok(())
    }

    fn num_samples(&self) -> usize {
        self.sample_ids.len()
    }

    fn populations(&self) -> Labels {
        self.populations.clone()
    }

    fn genotypes(&self) -> ArrayView2<'_, V> {
        self.genotypes.view()
    }
}

fn encode_populations<S: AsRef<str>>(names: &[S]) -> (Vec<String>, Labels) {
    let mut seen: Vec<String> = Vec::new();
    let codes = names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let code = match seen.iter().position(|s| s == name) {
                Some(code) => code,
                None => {
                    seen.push(name.to_string());
                    seen.len() - 1
                }
            };
            code as V
        })
        .collect::<Vec<V>>();
    (seen, Labels::from(codes))
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::array;
    use std::io::Write;

    fn write_dataset(dir: &Path) -> PathBuf {
        let path = dir.join("samples.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "sample,population,l1,l2,l3").unwrap();
        writeln!(file, "s1,north,0,1,2").unwrap();
        writeln!(file, "s2,south,2,NA,0").unwrap();
        writeln!(file, "s3,north,1,1,-9").unwrap();
        path
    }

    #[test]
    fn loads_lazily_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let mut dataset = GenotypeDataset::new(write_dataset(dir.path()));
        assert_eq!(dataset.num_samples(), 0);

        dataset.load().unwrap();
        assert_eq!(dataset.num_samples(), 3);
        assert_eq!(dataset.loci(), &["l1", "l2", "l3"]);
        assert_eq!(dataset.population_names(), &["north", "south"]);
        assert_eq!(dataset.populations(), array![0.0, 1.0, 0.0]);
        assert_eq!(dataset.genotypes()[[0, 2]], 2.0);
        assert!(dataset.genotypes()[[1, 1]].is_nan());
        assert!(dataset.genotypes()[[2, 2]].is_nan());
    }

    #[test]
    fn load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_dataset(dir.path());
        let mut dataset = GenotypeDataset::new(&path);
        dataset.load().unwrap();
        // a second load must not go back to disk
        std::fs::remove_file(&path).unwrap();
        dataset.load().unwrap();
        assert_eq!(dataset.num_samples(), 3);
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut dataset = GenotypeDataset::new("/nonexistent/samples.csv");
        assert!(dataset.load().is_err());
        assert_eq!(dataset.num_samples(), 0);
    }

    #[test]
    fn from_parts_checks_alignment() {
        let genotypes = array![[0.0, 1.0], [1.0, 2.0]];
        let ids = vec!["a".to_string(), "b".to_string()];
        assert!(GenotypeDataset::from_parts(ids.clone(), &["x"], genotypes.clone()).is_err());

        let dataset = GenotypeDataset::from_parts(ids, &["x", "y"], genotypes).unwrap();
        assert_eq!(dataset.num_samples(), 2);
        assert_eq!(dataset.populations(), array![0.0, 1.0]);
    }
}
