/*!
 * Tests for the application controller
 */

use anyhow::Result;

use labelflow::app_config::Config;
use labelflow::app_controller::Controller;
use labelflow::language_utils::ScriptTag;

use crate::common;

/// Test that the default controller uses the example region
#[test]
fn test_controller_withDefaultConfig_shouldReport25Lines() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert_eq!(controller.capacity().max_lines, 25);
    Ok(())
}

/// Test that an invalid configuration is refused
#[test]
fn test_controller_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.layout.line_spacing = 0.0;
    assert!(Controller::with_config(config).is_err());
}

/// Test analysis of a single file
#[test]
fn test_analyze_file_withMultilingualText_shouldProfileScripts() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "care.txt", &common::multilingual_care_text())?;
    let controller = Controller::new_for_test()?;

    let report = controller.analyze_file(&path)?;

    assert!(!report.analysis.has_overflow);
    assert_eq!(report.analysis.chunks.len(), 1);
    assert!(report.scripts.is_mixed());
    assert_eq!(report.scripts.dominant_script(), Some(ScriptTag::Chinese));
    Ok(())
}

/// Test that a missing input file is an error
#[test]
fn test_analyze_file_withMissingFile_shouldFail() -> Result<()> {
    let controller = Controller::new_for_test()?;
    assert!(controller.analyze_file("missing/care.txt").is_err());
    Ok(())
}

/// Test folder analysis counts overflowing files
#[test]
fn test_analyze_folder_withMixedFiles_shouldSummarize() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "short.txt", "100% cotton")?;
    common::create_test_file(temp_dir.path(), "long/wash.txt", &common::numbered_lines(43))?;
    let controller = Controller::new_for_test()?;

    let (reports, summary) = controller.analyze_folder(temp_dir.path())?;

    assert_eq!(reports.len(), 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.overflowing, 1);
    assert_eq!(summary.failed, 0);
    Ok(())
}

/// Test that an empty folder is reported
#[test]
fn test_analyze_folder_withNoTextFiles_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;
    assert!(controller.analyze_folder(temp_dir.path()).is_err());
    Ok(())
}
