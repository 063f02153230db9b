use anyhow::{Context, Result};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::io::output::{write_depth_table, write_points_txt, write_seed_pair};
use crate::io::PointCloud;
use crate::mesh_to_centerline::{prepare_seed_points, seeds_from_config};
use crate::processing::{AxisMidpointProfiler, MidpointProfile, ProfileOptions};

pub const SEED_FILE_NAME: &str = "seeds.json";
pub const CENTERLINE_STEM: &str = "centerline_full";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DepthProfiles,
    SeedSelection,
    TextExport,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::DepthProfiles => "depth profiles",
            Stage::SeedSelection => "seed selection",
            Stage::TextExport => "text export",
        };
        f.write_str(name)
    }
}

/// Outcome of one stage over all cases. Failed items keep their error.
#[derive(Debug)]
pub struct StageReport {
    pub stage: Stage,
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl StageReport {
    fn new(stage: Stage) -> Self {
        Self {
            stage,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

type ItemResult = (PathBuf, Result<()>);

/// Every subdirectory of `root`, sorted by path.
pub fn discover_cases<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut cases = Vec::new();
    for entry in fs::read_dir(root)
        .with_context(|| format!("failed to list cases in {}", root.display()))?
    {
        let path = entry?.path();
        if path.is_dir() {
            cases.push(path);
        }
    }
    cases.sort();
    Ok(cases)
}

fn run_stage<F>(stage: Stage, cases: &[PathBuf], fail_fast: bool, per_case: F) -> Result<StageReport>
where
    F: Fn(&Path) -> Vec<ItemResult> + Send + Sync,
{
    // collect() keeps case order, so reports come out sorted.
    let results: Vec<Vec<ItemResult>> = cases.par_iter().map(|case| per_case(case.as_path())).collect();

    let mut report = StageReport::new(stage);
    for (path, result) in results.into_iter().flatten() {
        match result {
            Ok(()) => {
                info!("[{}] wrote {:?}", stage, path);
                report.succeeded.push(path);
            }
            Err(e) => {
                warn!("[{}] {:?} failed: {:#}", stage, path, e);
                if fail_fast {
                    return Err(e.context(format!("{} failed for {}", stage, path.display())));
                }
                report.failed.push((path, e));
            }
        }
    }
    info!(
        "[{}] {} succeeded, {} failed",
        stage,
        report.succeeded.len(),
        report.failed.len()
    );
    Ok(report)
}

fn recreate_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)
            .with_context(|| format!("failed to clear {}", dir.display()))?;
    }
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    Ok(())
}

fn profile_vessel(
    profiler: &AxisMidpointProfiler,
    mesh_path: &Path,
    metadata_path: &Path,
) -> Result<()> {
    let cloud = PointCloud::load(mesh_path)?;
    let profile = profiler
        .profile(&cloud)
        .with_context(|| format!("profiling {}", mesh_path.display()))?;
    write_depth_table(metadata_path, &profile.depths)
}

/// Writes `<case>/<metadata_dir>/<vessel>.json` for every vessel mesh found.
/// The metadata directory is emptied first.
pub fn run_depth_stage(config: &PipelineConfig, cases: &[PathBuf]) -> Result<StageReport> {
    let profiler = AxisMidpointProfiler::new(config.profile.clone())?;
    run_stage(
        Stage::DepthProfiles,
        cases,
        config.general.fail_fast,
        |case| {
            let metadata_dir = case.join(&config.general.metadata_dir);
            if let Err(e) = recreate_dir(&metadata_dir) {
                return vec![(metadata_dir, Err(e))];
            }

            let mut items = Vec::new();
            for vessel in &config.vessels.names {
                let mesh_path =
                    case.join(format!("{}.{}", vessel, config.vessels.mesh_extension));
                if !mesh_path.exists() {
                    debug!("No mesh for {} at {:?}", vessel, mesh_path);
                    continue;
                }
                let metadata_path = metadata_dir.join(format!("{}.json", vessel));
                let result = profile_vessel(&profiler, &mesh_path, &metadata_path);
                items.push((metadata_path, result));
            }
            items
        },
    )
}

/// Writes `<case>/<centerline_dir>/<vessel>/seeds.json` for every vessel with metadata.
pub fn run_seed_stage(config: &PipelineConfig, cases: &[PathBuf]) -> Result<StageReport> {
    let strategy = seeds_from_config(&config.seeds);
    run_stage(
        Stage::SeedSelection,
        cases,
        config.general.fail_fast,
        |case| {
            let metadata_dir = case.join(&config.general.metadata_dir);
            config
                .vessels
                .names
                .iter()
                .filter_map(|vessel| {
                    let metadata_path = metadata_dir.join(format!("{}.json", vessel));
                    if !metadata_path.exists() {
                        debug!("No depth metadata for {} at {:?}", vessel, metadata_path);
                        return None;
                    }
                    let seeds_path = case
                        .join(&config.general.centerline_dir)
                        .join(vessel)
                        .join(SEED_FILE_NAME);
                    let result = prepare_seed_points(&metadata_path, strategy)
                        .and_then(|seeds| write_seed_pair(&seeds_path, &seeds));
                    Some((seeds_path, result))
                })
                .collect()
        },
    )
}

/// Converts every `centerline_full.<ext>` under the centerline directory to
/// `centerline_full.txt` next to it.
pub fn run_export_stage(config: &PipelineConfig, cases: &[PathBuf]) -> Result<StageReport> {
    run_stage(
        Stage::TextExport,
        cases,
        config.general.fail_fast,
        |case| {
            let centerline_root = case.join(&config.general.centerline_dir);
            config
                .vessels
                .names
                .iter()
                .filter_map(|vessel| {
                    let vessel_dir = centerline_root.join(vessel);
                    let input = vessel_dir.join(format!(
                        "{}.{}",
                        CENTERLINE_STEM, config.vessels.centerline_extension
                    ));
                    if !input.exists() {
                        debug!("No centerline for {} at {:?}", vessel, input);
                        return None;
                    }
                    let output = vessel_dir.join(format!("{}.txt", CENTERLINE_STEM));
                    let result = export_points_txt(&input, Some(&output)).map(|_| ());
                    Some((output, result))
                })
                .collect()
        },
    )
}

/// Runs the enabled stages in order: depth profiles, seeds, text export.
pub fn run_pipeline(config: &PipelineConfig) -> Result<Vec<StageReport>> {
    let cases = discover_cases(&config.general.root_dir)?;
    info!(
        "Found {} cases in {:?}",
        cases.len(),
        config.general.root_dir
    );

    let mut reports = Vec::new();
    if config.processing.run_depth_profiles {
        reports.push(run_depth_stage(config, &cases)?);
    }
    if config.processing.run_seed_selection {
        reports.push(run_seed_stage(config, &cases)?);
    }
    if config.processing.run_text_export {
        reports.push(run_export_stage(config, &cases)?);
    }
    Ok(reports)
}

/// Profiles a single mesh file.
pub fn profile_mesh<P: AsRef<Path>>(path: P, options: ProfileOptions) -> Result<MidpointProfile> {
    let path = path.as_ref();
    let profiler = AxisMidpointProfiler::new(options)?;
    let cloud = PointCloud::load(path)?;
    let profile = profiler
        .profile(&cloud)
        .with_context(|| format!("profiling {}", path.display()))?;
    Ok(profile)
}

/// Rewrites any readable point file in the `x y z` text format.
/// Without `output` the result lands next to the input with a `.txt` extension.
pub fn export_points_txt<P: AsRef<Path>>(input: P, output: Option<&Path>) -> Result<PathBuf> {
    let input = input.as_ref();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("txt"));
    let cloud = PointCloud::load(input)?;
    write_points_txt(&output, cloud.points())?;
    Ok(output)
}

#[cfg(test)]
mod entry_tests {
    use super::*;
    use crate::config::{
        GeneralConfig, ProcessingConfig, SeedConfig, VesselConfig,
    };
    use crate::io::input::{read_depth_table, read_points_txt, read_seed_pair};
    use crate::utils::test_utils::{generate_cylinder_points, unique_temp_dir};
    use std::io::Write;

    fn write_obj(path: &Path, cloud: &PointCloud) {
        let mut file = fs::File::create(path).unwrap();
        writeln!(file, "# test mesh").unwrap();
        for p in cloud.points() {
            writeln!(file, "v {} {} {}", p.x, p.y, p.z).unwrap();
        }
        writeln!(file, "f 1 2 3").unwrap();
    }

    fn test_config(root: &Path, fail_fast: bool) -> PipelineConfig {
        PipelineConfig {
            general: GeneralConfig {
                root_dir: root.to_path_buf(),
                metadata_dir: "metadata".to_string(),
                centerline_dir: "centerlines".to_string(),
                fail_fast,
            },
            vessels: VesselConfig {
                names: vec!["aorta".to_string(), "left_la".to_string()],
                ..VesselConfig::default()
            },
            profile: ProfileOptions::default(),
            seeds: SeedConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }

    fn setup_cases(root: &Path) {
        for case in ["case_b", "case_a"] {
            fs::create_dir_all(root.join(case)).unwrap();
            write_obj(
                &root.join(case).join("aorta.obj"),
                &generate_cylinder_points(1.0, 10.0, 0.5, 12),
            );
        }
        fs::write(root.join("notes.txt"), "not a case").unwrap();
    }

    #[test]
    fn test_discover_cases_sorted_dirs_only() {
        let root = unique_temp_dir("discover");
        setup_cases(&root);
        let cases = discover_cases(&root).unwrap();
        assert_eq!(cases, vec![root.join("case_a"), root.join("case_b")]);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_full_pipeline() {
        let root = unique_temp_dir("pipeline");
        setup_cases(&root);
        let stale = root.join("case_a").join("metadata").join("stale.json");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "{}").unwrap();

        let config = test_config(&root, false);
        let reports = run_pipeline(&config).unwrap();
        assert_eq!(reports.len(), 3);

        let depth = &reports[0];
        assert_eq!(depth.stage, Stage::DepthProfiles);
        assert!(depth.is_clean());
        assert_eq!(
            depth.succeeded,
            vec![
                root.join("case_a").join("metadata").join("aorta.json"),
                root.join("case_b").join("metadata").join("aorta.json"),
            ]
        );
        assert!(!stale.exists());
        let table = read_depth_table(&depth.succeeded[0]).unwrap();
        assert_eq!(table.depths().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);

        let seeds = &reports[1];
        assert_eq!(seeds.succeeded.len(), 2);
        let pair = read_seed_pair(&seeds.succeeded[0]).unwrap();
        assert_eq!(pair.source_depth, 0);
        assert_eq!(pair.target_depth, 8);
        assert!(seeds.succeeded[0].ends_with("case_a/centerlines/aorta/seeds.json"));

        // No centerlines were solved yet.
        assert!(reports[2].succeeded.is_empty());
        assert!(reports[2].is_clean());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_export_stage_converts_centerlines() {
        let root = unique_temp_dir("export_stage");
        let vessel_dir = root.join("case_a").join("centerlines").join("aorta");
        fs::create_dir_all(&vessel_dir).unwrap();
        let line: PointCloud = PointCloud::from_tuples(&[
            (0.0, 0.0, 0.0),
            (0.1, 0.2, 1.0),
            (0.25, 0.5, 2.0),
        ]);
        write_obj(&vessel_dir.join("centerline_full.obj"), &line);

        let config = test_config(&root, false);
        let cases = discover_cases(&root).unwrap();
        let report = run_export_stage(&config, &cases).unwrap();
        assert_eq!(report.succeeded, vec![vessel_dir.join("centerline_full.txt")]);

        let contents = fs::read_to_string(vessel_dir.join("centerline_full.txt")).unwrap();
        assert_eq!(
            contents,
            "0.000 0.000 0.000\n0.100 0.200 1.000\n0.250 0.500 2.000\n"
        );
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_failures_are_reported_per_item() {
        let root = unique_temp_dir("pipeline_failure");
        setup_cases(&root);
        fs::write(root.join("case_b").join("left_la.obj"), "v 1.0 2.0\n").unwrap();

        let config = test_config(&root, false);
        let cases = discover_cases(&root).unwrap();
        let report = run_depth_stage(&config, &cases).unwrap();
        assert_eq!(report.succeeded.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(
            report.failed[0].0,
            root.join("case_b").join("metadata").join("left_la.json")
        );

        let config = test_config(&root, true);
        assert!(run_depth_stage(&config, &cases).is_err());
        assert!(run_pipeline(&config).is_err());
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_seed_stage_reports_short_tables() {
        let root = unique_temp_dir("seed_failure");
        let case = root.join("case_a");
        fs::create_dir_all(&case).unwrap();
        // Extent below one unit along every axis leaves a single depth.
        write_obj(
            &case.join("aorta.obj"),
            &generate_cylinder_points(0.2, 0.5, 0.25, 8),
        );

        let config = test_config(&root, false);
        let reports = run_pipeline(&config).unwrap();
        assert!(reports[0].is_clean());
        assert_eq!(reports[1].failed.len(), 1);
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_profile_mesh_and_export() {
        let root = unique_temp_dir("single_mesh");
        let mesh = root.join("vessel.obj");
        write_obj(&mesh, &generate_cylinder_points(1.5, 8.0, 0.5, 10));

        let profile = profile_mesh(&mesh, ProfileOptions::default()).unwrap();
        assert_eq!(profile.depths.depths().collect::<Vec<_>>(), vec![0, 2, 4, 6]);

        let out = export_points_txt(&mesh, None).unwrap();
        assert_eq!(out, root.join("vessel.txt"));
        assert_eq!(read_points_txt(&out).unwrap().len(), 17 * 10);

        assert!(profile_mesh(root.join("vessel.vtp"), ProfileOptions::default()).is_err());
        let _ = fs::remove_dir_all(&root);
    }
}
