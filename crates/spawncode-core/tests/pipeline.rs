use spawncode_core::{run, AutoApprove, KitPrefix, Manifest, ProjectLayout, RunMode, RunOptions};
use std::fs;
use std::path::Path;

const MANIFEST: &str = r#"
data:
  sports:
    handling: ADDER
    audio: adder
  muscle:
    handling: DOMINATOR
    audio: dominator
vehicles:
  oldcar:
    code: "ABC#"
    data: sports
  musclecar:
    code: "MSC#"
    data: muscle
  fastcar:
    code: "ABC#"
    data: sports
"#;

const VEHICLES_META: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CVehicleModelInfo__InitDataList>
  <InitDatas>
    <Item>
      <modelName>oldcar</modelName>
      <txdName>oldcar</txdName>
      <handlingId>OLDCAR</handlingId>
      <gameName>OLDCAR</gameName>
      <audioNameHash>oldcar</audioNameHash>
    </Item>
    <Item>
      <modelName>musclecar</modelName>
      <txdName>musclecar</txdName>
      <handlingId>MUSCLECAR</handlingId>
      <gameName>MUSCLECAR</gameName>
      <audioNameHash>musclecar</audioNameHash>
    </Item>
  </InitDatas>
</CVehicleModelInfo__InitDataList>
"#;

const CARVARIATIONS_META: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CVehicleModelInfoVariation>
  <variationData>
    <Item>
      <modelName>fastcar</modelName>
    </Item>
  </variationData>
</CVehicleModelInfoVariation>
"#;

const CARCOLS_META: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CVehicleModelInfoVarGlobal>
  <Kits>
    <Item>
      <kitName>42_oldcar_modkit</kitName>
      <id value="42" />
    </Item>
  </Kits>
</CVehicleModelInfoVarGlobal>
"#;

const SCRIPT: &str = r#"Citizen.CreateThread(function()
    AddTextEntry("oldcar", "Old Car")
    AddTextEntry("musclecar", "Muscle Car")
    AddTextEntry("fastcar", "Fast Car")
end)
"#;

fn write(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn fixture_project(root: &Path) -> ProjectLayout {
    let layout = ProjectLayout::rooted_at(root);
    write(&layout.manifest, MANIFEST.as_bytes());
    for name in ["oldcar.yft", "oldcar.ytd", "oldcar_hi.yft", "musclecar.yft", "fastcar.yft"] {
        write(&layout.assets_dir.join(name), b"RSC7");
    }
    write(&layout.meta_dir.join("oldcar").join("vehicles.meta"), VEHICLES_META.as_bytes());
    write(&layout.meta_dir.join("fastcar").join("carvariations.meta"), CARVARIATIONS_META.as_bytes());
    write(&layout.meta_dir.join("oldcar").join("carcols.meta"), CARCOLS_META.as_bytes());
    write(&layout.script, SCRIPT.as_bytes());
    layout
}

#[test]
fn full_run_propagates_codes_everywhere() {
    let dir = tempfile::tempdir().unwrap();
    let layout = fixture_project(dir.path());
    let manifest = Manifest::load(&layout.manifest).unwrap();
    let options = RunOptions::new(RunMode::Full).with_kit_prefix(KitPrefix::new(3).unwrap());

    let report = run(&layout, &manifest, &options, &AutoApprove).unwrap();

    for name in ["ABC1.yft", "ABC1.ytd", "ABC1_hi.yft", "MSC1.yft", "ABC2.yft"] {
        assert!(layout.assets_dir.join(name).is_file(), "{} was not created", name);
    }
    assert_eq!(report.assets_renamed, 5);

    let vehicles = fs::read_to_string(layout.meta_dir.join("oldcar").join("vehicles.meta")).unwrap();
    assert!(vehicles.contains("<modelName>ABC1</modelName>"));
    assert!(vehicles.contains("<handlingId>ADDER</handlingId>"));
    assert!(vehicles.contains("<gameName>MSC1</gameName>"));
    assert!(vehicles.contains("<audioNameHash>dominator</audioNameHash>"));
    assert!(vehicles.contains("\r\n"));

    let variations = fs::read_to_string(layout.meta_dir.join("fastcar").join("carvariations.meta")).unwrap();
    assert!(variations.contains("<modelName>ABC2</modelName>"));

    let kits = fs::read_to_string(layout.meta_dir.join("oldcar").join("carcols.meta")).unwrap();
    assert!(kits.contains(r#"<id value="342"/>"#));

    let script = fs::read_to_string(&layout.script).unwrap();
    assert!(script.contains(r#"AddTextEntry("ABC1", "Old Car")"#));
    assert!(script.contains(r#"AddTextEntry("MSC1", "Muscle Car")"#));
    assert!(script.contains(r#"AddTextEntry("ABC2", "Fast Car")"#));

    assert_eq!(report.documents_rewritten, 3);
    assert_eq!(report.script_replacements, 3);
    assert_eq!(report.kits_prefixed, 1);
}

#[test]
fn script_mode_touches_only_the_script() {
    let dir = tempfile::tempdir().unwrap();
    let layout = fixture_project(dir.path());
    let manifest = Manifest::load(&layout.manifest).unwrap();

    let report = run(&layout, &manifest, &RunOptions::new(RunMode::Script), &AutoApprove).unwrap();

    assert_eq!(report.script_replacements, 3);
    assert!(layout.assets_dir.join("oldcar.yft").is_file());
    let vehicles = fs::read_to_string(layout.meta_dir.join("oldcar").join("vehicles.meta")).unwrap();
    assert_eq!(vehicles, VEHICLES_META);
}

#[test]
fn dry_run_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let layout = fixture_project(dir.path());
    let manifest = Manifest::load(&layout.manifest).unwrap();
    let options = RunOptions::new(RunMode::Full)
        .with_kit_prefix(KitPrefix::new(1).unwrap())
        .with_dry_run(true);

    let report = run(&layout, &manifest, &options, &AutoApprove).unwrap();

    assert_eq!(report.assets_renamed, 5);
    assert!(layout.assets_dir.join("oldcar.yft").is_file());
    assert_eq!(fs::read_to_string(&layout.script).unwrap(), SCRIPT);
}
