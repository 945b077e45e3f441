use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use anyhow::Result;
use sipgen_core::config::{ProjectConfig, RunOptions};
use sipgen_core::destinations::{DestinationEntry, DestinationRouter};
use sipgen_core::index::RecordIndex;
use sipgen_core::mappings::{
    AggregateSource, MappingKind, PathMapping, PermissionService, StreamingMetadataService,
};
use sipgen_core::model::{PatronAccess, StructuralType};
use sipgen_core::{GenerationContext, SipError};

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).expect("write fixture");
    path
}

#[test]
fn index_loads_records_and_children() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "index.csv",
        "id,parent_id,created,structural_type\n\
         604,,2005-12-08,compound_parent\n\
         602,604,2005-12-08,compound_child\n\
         601,604,2005-12-08T10:00:00Z,compound_child\n\
         25,,2005-12-09,\n",
    );

    let index = RecordIndex::load_csv(&path)?;

    assert_eq!(index.len(), 4);
    let top: Vec<_> = index.top_level().iter().map(|r| r.legacy_id.clone()).collect();
    assert_eq!(top, vec!["25", "604"]);
    let children: Vec<_> = index
        .children_of("604")
        .iter()
        .map(|r| r.legacy_id.clone())
        .collect();
    assert_eq!(children, vec!["602", "601"]);
    assert_eq!(
        index.get("25").map(|r| r.structural_type),
        Some(StructuralType::Simple)
    );
    assert!(index.children_of("25").is_empty());
    Ok(())
}

#[test]
fn index_reports_records_with_unknown_parents() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "index.csv",
        "id,parent_id,created,structural_type\n\
         604,,2005-12-08,compound_parent\n\
         601,604,2005-12-08,compound_child\n\
         701,700,2005-12-08,compound_child\n",
    );

    let index = RecordIndex::load_csv(&path)?;

    let orphans: Vec<_> = index.orphans().iter().map(|r| r.legacy_id.clone()).collect();
    assert_eq!(orphans, vec!["701"]);
    let top: Vec<_> = index.top_level().iter().map(|r| r.legacy_id.clone()).collect();
    assert_eq!(top, vec!["604"]);
    assert_eq!(index.get("701").and_then(|r| r.parent_id.as_deref()), Some("700"));
    Ok(())
}

#[test]
fn index_rejects_bad_timestamps() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "index.csv",
        "id,parent_id,created,structural_type\n25,,yesterday,simple\n",
    );

    let err = RecordIndex::load_csv(&path).expect_err("bad timestamp");
    assert!(matches!(err, SipError::InvalidRow { .. }));
    Ok(())
}

#[test]
fn path_mapping_skips_unmapped_rows() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "source_files.csv",
        "id,matching_value,source_file,potential_matches\n\
         25,25.tif,/data/25.tif|/data/alt/25.tif,\n\
         26,26.tif,,\n",
    );

    let mapping = PathMapping::load_csv(MappingKind::SourceFile, &path)?;

    assert_eq!(mapping.len(), 1);
    let entry = mapping.get("25").expect("mapped entry");
    assert_eq!(entry.primary_path(), Path::new("/data/25.tif"));
    assert_eq!(entry.paths.len(), 2);
    assert!(mapping.get("26").is_none());
    Ok(())
}

#[test]
fn path_mapping_requires_absolute_paths() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "access_files.csv",
        "id,matching_value,source_file,potential_matches\n25,,relative/25.jpg,\n",
    );

    let err = PathMapping::load_csv(MappingKind::AccessFile, &path).expect_err("relative path");
    assert!(err.to_string().contains("access_file"));
    Ok(())
}

#[test]
fn permissions_fall_back_to_default_row() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "patron_access.csv",
        "id,everyone,authenticated\n\
         default,canViewMetadata,canViewOriginals\n\
         26,none,canViewAccessCopies\n",
    );

    let service = PermissionService::load_csv(&path)?;

    let specific = service.resolve("26").expect("specific");
    assert_eq!(specific.everyone, PatronAccess::NoAccess);
    assert_eq!(specific.authenticated, PatronAccess::CanViewAccessCopies);
    let fallback = service.resolve("25").expect("default");
    assert_eq!(fallback.everyone, PatronAccess::CanViewMetadata);

    assert!(PermissionService::default().resolve("25").is_none());
    Ok(())
}

#[test]
fn permissions_reject_unknown_roles() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "patron_access.csv",
        "id,everyone,authenticated\n25,everything,none\n",
    );

    assert!(PermissionService::load_csv(&path).is_err());
    Ok(())
}

#[test]
fn destinations_require_default_row() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let with_default = write(
        dir.path(),
        "destinations.csv",
        "id,dest,new_collection\n\
         default,bdbd99af-36a5-4bab-9785-e3a802d3737e,\n\
         25,0f1e2d3c-aaaa-4bbb-8ccc-000000000000,Gilmer Maps\n",
    );
    let router = DestinationRouter::load_csv(&with_default)?;
    assert_eq!(
        router.resolve("26"),
        &DestinationEntry::existing("bdbd99af-36a5-4bab-9785-e3a802d3737e")
    );
    assert_eq!(
        router.resolve("25").new_collection.as_deref(),
        Some("Gilmer Maps")
    );

    let first = router.new_collection_id("Gilmer Maps").expect("collection id");
    assert_eq!(router.new_collection_id("Gilmer Maps"), Some(first));
    assert!(router.new_collection_id("Unknown").is_none());

    let without_default = write(
        dir.path(),
        "no_default.csv",
        "id,dest,new_collection\n25,0f1e2d3c-aaaa-4bbb-8ccc-000000000000,\n",
    );
    assert!(matches!(
        DestinationRouter::load_csv(&without_default),
        Err(SipError::Configuration(_))
    ));
    Ok(())
}

#[test]
fn streaming_metadata_loads_from_csv() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write(
        dir.path(),
        "streaming.csv",
        "id,streaming_file,streaming_space\n\
         40,oral-history.mp3,open-hls\n\
         41,,open-hls\n",
    );

    let service = StreamingMetadataService::load_csv("https://stream.example.edu/player", &path)?;

    let reference = service.reference_for("40").expect("streaming entry");
    assert_eq!(
        reference.url,
        "https://stream.example.edu/player?spaceId=open-hls&filename=oral-history.mp3"
    );
    assert_eq!(reference.media_type.as_str(), "sound");
    assert!(service.get("41").is_none());
    Ok(())
}

#[test]
fn aggregate_source_reads_files_lazily() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let top = write(
        dir.path(),
        "aggregate_top.csv",
        "id,matching_value,source_file,potential_matches\n604,,/data/604_top.pdf,\n",
    );

    let source = AggregateSource::from_paths(Some(top.clone()), None);
    assert!(!source.is_loaded());
    fs::write(
        &top,
        "id,matching_value,source_file,potential_matches\n605,,/data/605_top.pdf,\n",
    )?;

    let mappings = source.get()?;
    assert!(source.is_loaded());
    assert!(mappings.top_for("604").is_none());
    assert!(mappings.top_for("605").is_some());
    assert!(mappings.bottom_for("605").is_none());
    Ok(())
}

#[test]
fn context_loads_from_project_config() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    write(
        root,
        "index.csv",
        "id,parent_id,created,structural_type\n25,,2005-12-08,simple\n",
    );
    write(
        root,
        "destinations.csv",
        "id,dest,new_collection\ndefault,bdbd99af-36a5-4bab-9785-e3a802d3737e,\n",
    );
    write(
        root,
        "source_files.csv",
        "id,matching_value,source_file,potential_matches\n25,,/data/25.tif,\n",
    );
    let config_path = write(
        root,
        "sipgen.toml",
        r#"
project_name = "gilmer"
index = "index.csv"
destinations = "destinations.csv"
source_files = "source_files.csv"
aggregate_top = "not_yet_written.csv"
descriptions_dir = "descriptions"
sips_dir = "sips"
redirect_mapping = "redirect_mappings.csv"
report_dir = "reports"
max_parallel_destinations = 2
"#,
    );

    let config = ProjectConfig::load(&config_path)?;
    let ctx = GenerationContext::load(&config, RunOptions::new("migr_user", false))?;

    assert_eq!(ctx.index.len(), 1);
    assert!(ctx.source_files.get("25").is_some());
    assert!(ctx.access_files.is_empty());
    assert!(!ctx.aggregates.is_loaded());
    assert_eq!(ctx.descriptions.dir(), root.join("descriptions"));
    assert_eq!(ctx.options.max_parallel, NonZeroUsize::new(2));

    let err = GenerationContext::load(&config, RunOptions::new("", false))
        .expect_err("missing username");
    assert!(matches!(err, SipError::Configuration(_)));
    Ok(())
}
