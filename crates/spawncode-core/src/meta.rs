use anyhow::Result;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::codes::SpawnCodeMapping;
use crate::manifest::Manifest;
use crate::options::KitPrefix;
use crate::xml::{Document, Element, LineEnding};
use crate::{apply_content_change, ChangeReviewer, RunReport, SpawnError};

const ITEM: &str = "Item";

const INIT_DATAS: &str = "InitDatas";
const MODEL_NAME: &str = "modelName";
const TXD_NAME: &str = "txdName";
const HANDLING_ID: &str = "handlingId";
const GAME_NAME: &str = "gameName";
const AUDIO_NAME_HASH: &str = "audioNameHash";
const INIT_DATA_FIELDS: [&str; 5] = [MODEL_NAME, TXD_NAME, HANDLING_ID, GAME_NAME, AUDIO_NAME_HASH];

const VARIATION_DATA: &str = "variationData";

const KITS: &str = "Kits";
const KIT_ID: &str = "id";
const VALUE: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaKind {
    VehicleInitData,
    VariationData,
    ModKitList,
}

impl MetaKind {
    pub fn file_name(self) -> &'static str {
        match self {
            MetaKind::VehicleInitData => "vehicles.meta",
            MetaKind::VariationData => "carvariations.meta",
            MetaKind::ModKitList => "carcols.meta",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        [MetaKind::VehicleInitData, MetaKind::VariationData, MetaKind::ModKitList]
            .into_iter()
            .find(|kind| kind.file_name() == name)
    }
}

impl fmt::Display for MetaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

fn structure_error(kind: MetaKind, message: String) -> SpawnError {
    SpawnError::Structure { kind, message }
}

/// Items of the list element `list` under the root, failing if the list is absent.
fn list_items<'a>(root: &'a Element, list: &'a str, kind: MetaKind) -> Result<Vec<&'a Element>, SpawnError> {
    let list_element = root
        .child(list)
        .ok_or_else(|| structure_error(kind, format!("<{}> has no <{}> list", root.name, list)))?;
    Ok(list_element.children_named(ITEM).collect())
}

fn require_fields(item: &Element, index: usize, fields: &[&str], kind: MetaKind) -> Result<(), SpawnError> {
    for field in fields {
        if item.child(field).is_none() {
            return Err(structure_error(
                kind,
                format!("item {} is missing <{}>", index, field),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct InitDataRecord {
    pub model_name: String,
    pub txd_name: String,
    pub handling_id: String,
    pub game_name: String,
    pub audio_name_hash: String,
}

/// `vehicles.meta`: one item per vehicle model.
#[derive(Debug, Clone)]
pub struct InitDataList {
    document: Document,
}

impl InitDataList {
    pub fn from_document(document: Document) -> Result<Self, SpawnError> {
        let kind = MetaKind::VehicleInitData;
        for (index, item) in list_items(&document.root, INIT_DATAS, kind)?.into_iter().enumerate() {
            require_fields(item, index, &INIT_DATA_FIELDS, kind)?;
        }
        Ok(Self { document })
    }

    #[cfg(test)]
    pub(crate) fn records(&self) -> Vec<InitDataRecord> {
        let field = |item: &Element, name: &str| item.child_text(name).unwrap_or_default();
        self.document
            .root
            .child(INIT_DATAS)
            .into_iter()
            .flat_map(|list| list.children_named(ITEM))
            .map(|item| InitDataRecord {
                model_name: field(item, MODEL_NAME),
                txd_name: field(item, TXD_NAME),
                handling_id: field(item, HANDLING_ID),
                game_name: field(item, GAME_NAME),
                audio_name_hash: field(item, AUDIO_NAME_HASH),
            })
            .collect()
    }

    /// Model, texture dictionary and game name all become the new code; handling
    /// and audio come from the template of the original identifier.
    pub fn apply(&mut self, manifest: &Manifest, mapping: &SpawnCodeMapping) -> usize {
        let Some(list) = self.document.root.child_mut(INIT_DATAS) else {
            return 0;
        };

        let mut updated = 0;
        for item in list.children_named_mut(ITEM) {
            let model_name = item.child_text(MODEL_NAME).unwrap_or_default();
            let Some((original, code)) = mapping.lookup(&model_name) else {
                continue;
            };
            let Some(template) = manifest.template_for(original) else {
                continue;
            };

            item.set_child_text(MODEL_NAME, code);
            item.set_child_text(TXD_NAME, code);
            item.set_child_text(GAME_NAME, code);
            item.set_child_text(HANDLING_ID, &template.handling);
            item.set_child_text(AUDIO_NAME_HASH, &template.audio);

            debug!("Init data: '{}' -> '{}'", model_name, code);
            updated += 1;
        }
        updated
    }
}

/// `carvariations.meta`: only the model name references the vehicle.
#[derive(Debug, Clone)]
pub struct VariationList {
    document: Document,
}

impl VariationList {
    pub fn from_document(document: Document) -> Result<Self, SpawnError> {
        let kind = MetaKind::VariationData;
        for (index, item) in list_items(&document.root, VARIATION_DATA, kind)?.into_iter().enumerate() {
            require_fields(item, index, &[MODEL_NAME], kind)?;
        }
        Ok(Self { document })
    }

    #[cfg(test)]
    pub(crate) fn model_names(&self) -> Vec<String> {
        self.document
            .root
            .child(VARIATION_DATA)
            .into_iter()
            .flat_map(|list| list.children_named(ITEM))
            .map(|item| item.child_text(MODEL_NAME).unwrap_or_default())
            .collect()
    }

    pub fn apply(&mut self, mapping: &SpawnCodeMapping) -> usize {
        let Some(list) = self.document.root.child_mut(VARIATION_DATA) else {
            return 0;
        };

        let mut updated = 0;
        for item in list.children_named_mut(ITEM) {
            let model_name = item.child_text(MODEL_NAME).unwrap_or_default();
            if let Some(code) = mapping.code_for(&model_name) {
                item.set_child_text(MODEL_NAME, code);
                debug!("Variation: '{}' -> '{}'", model_name, code);
                updated += 1;
            }
        }
        updated
    }
}

/// `carcols.meta`: modification kits keyed by a numeric id attribute.
#[derive(Debug, Clone)]
pub struct ModKitList {
    document: Document,
}

impl ModKitList {
    pub fn from_document(document: Document) -> Result<Self, SpawnError> {
        let kind = MetaKind::ModKitList;
        for (index, item) in list_items(&document.root, KITS, kind)?.into_iter().enumerate() {
            let has_value = item
                .child(KIT_ID)
                .and_then(|id| id.attribute(VALUE))
                .is_some();
            if !has_value {
                return Err(structure_error(
                    kind,
                    format!("kit {} has no <{} {}=\"...\"/>", index, KIT_ID, VALUE),
                ));
            }
        }
        Ok(Self { document })
    }

    #[cfg(test)]
    pub(crate) fn kit_ids(&self) -> Vec<String> {
        self.document
            .root
            .child(KITS)
            .into_iter()
            .flat_map(|list| list.children_named(ITEM))
            .filter_map(|item| item.child(KIT_ID).and_then(|id| id.attribute(VALUE)))
            .map(str::to_string)
            .collect()
    }

    /// Prepends the prefix to every kit id. Applying it twice prefixes twice.
    pub fn apply(&mut self, prefix: KitPrefix) -> usize {
        let Some(list) = self.document.root.child_mut(KITS) else {
            return 0;
        };

        let mut updated = 0;
        for item in list.children_named_mut(ITEM) {
            let Some(id) = item.child_mut(KIT_ID) else {
                continue;
            };
            let Some(value) = id.attribute(VALUE).map(str::to_string) else {
                continue;
            };
            let prefixed = format!("{}{}", prefix, value);
            debug!("Kit id: '{}' -> '{}'", value, prefixed);
            id.set_attribute(VALUE, &prefixed);
            updated += 1;
        }
        updated
    }
}

#[derive(Debug, Clone)]
pub enum MetaDocument {
    VehicleInitData(InitDataList),
    VariationData(VariationList),
    ModKitList(ModKitList),
}

impl MetaDocument {
    pub fn parse(kind: MetaKind, source: &str) -> Result<Self, SpawnError> {
        let document = Document::parse(source)?;
        Ok(match kind {
            MetaKind::VehicleInitData => MetaDocument::VehicleInitData(InitDataList::from_document(document)?),
            MetaKind::VariationData => MetaDocument::VariationData(VariationList::from_document(document)?),
            MetaKind::ModKitList => MetaDocument::ModKitList(ModKitList::from_document(document)?),
        })
    }

    pub fn kind(&self) -> MetaKind {
        match self {
            MetaDocument::VehicleInitData(_) => MetaKind::VehicleInitData,
            MetaDocument::VariationData(_) => MetaKind::VariationData,
            MetaDocument::ModKitList(_) => MetaKind::ModKitList,
        }
    }

    pub fn document(&self) -> &Document {
        match self {
            MetaDocument::VehicleInitData(list) => &list.document,
            MetaDocument::VariationData(list) => &list.document,
            MetaDocument::ModKitList(list) => &list.document,
        }
    }

    /// Applies the spawn code mapping. Kit lists are not keyed by vehicle and
    /// are left alone.
    pub fn apply_codes(&mut self, manifest: &Manifest, mapping: &SpawnCodeMapping) -> usize {
        match self {
            MetaDocument::VehicleInitData(list) => list.apply(manifest, mapping),
            MetaDocument::VariationData(list) => list.apply(mapping),
            MetaDocument::ModKitList(_) => 0,
        }
    }

    pub fn to_xml(&self) -> Result<String, SpawnError> {
        self.document().to_xml_string(LineEnding::Crlf)
    }
}

/// Depth-first search for the known metadata file names under `dir`.
///
/// Directories that cannot be listed are reported and skipped; the rest of the
/// tree is still searched.
pub fn locate_documents(dir: &Path, kinds: &[MetaKind], report: &mut RunReport) -> Vec<(PathBuf, MetaKind)> {
    let mut found = Vec::new();
    locate_documents_recursive(dir, kinds, &mut found, report);
    found
}

fn locate_documents_recursive(
    dir: &Path,
    kinds: &[MetaKind],
    found: &mut Vec<(PathBuf, MetaKind)>,
    report: &mut RunReport,
) {
    debug!("Searching directory: {:?}", dir);

    let listing = fs::read_dir(dir).and_then(|entries| entries.collect::<Result<Vec<_>, _>>());
    let mut entries = match listing {
        Ok(entries) => entries,
        Err(err) => {
            report.warn(format!("Skipping unreadable directory {:?}: {}", dir, err));
            return;
        }
    };
    entries.sort_by_key(|entry| entry.file_name());

    // Files first
    for entry in &entries {
        let path = entry.path();
        if path.is_file() {
            let kind = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(MetaKind::from_file_name);
            if let Some(kind) = kind.filter(|kind| kinds.contains(kind)) {
                debug!("Found {}: {:?}", kind, path);
                found.push((path, kind));
            }
        }
    }

    // Then subdirectories
    for entry in &entries {
        let path = entry.path();
        if path.is_dir() {
            locate_documents_recursive(&path, kinds, found, report);
        }
    }
}

fn locate_or_warn(meta_dir: &Path, kinds: &[MetaKind], report: &mut RunReport) -> Vec<(PathBuf, MetaKind)> {
    if !meta_dir.is_dir() {
        report.warn(format!("Metadata directory not found: {:?}", meta_dir));
        return Vec::new();
    }

    let located = locate_documents(meta_dir, kinds, report);
    for kind in kinds {
        if !located.iter().any(|(_, found)| found == kind) {
            report.warn(format!("No {} found under {:?}", kind, meta_dir));
        }
    }
    located
}

/// Rewrites every `vehicles.meta` and `carvariations.meta` under `meta_dir`.
///
/// All documents are read and validated before the first one is written back; a
/// structural mismatch in any of them aborts the step. Unreadable files are
/// skipped with a warning.
pub fn rewrite_metadata(
    meta_dir: &Path,
    manifest: &Manifest,
    mapping: &SpawnCodeMapping,
    reviewer: &dyn ChangeReviewer,
    dry_run: bool,
    report: &mut RunReport,
) -> Result<()> {
    info!("Rewriting metadata under: {:?}", meta_dir);

    let located = locate_or_warn(
        meta_dir,
        &[MetaKind::VehicleInitData, MetaKind::VariationData],
        report,
    );

    let mut documents = Vec::with_capacity(located.len());
    for (path, kind) in located {
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                report.warn(format!("Skipping unreadable {:?}: {}", path, err));
                continue;
            }
        };
        let document = MetaDocument::parse(kind, &source)
            .map_err(|err| anyhow::anyhow!("Invalid {} at {:?}: {}", kind, path, err))?;
        documents.push((path, source, document));
    }

    for (path, source, mut document) in documents {
        let updated = document.apply_codes(manifest, mapping);
        if updated == 0 {
            debug!("No matching vehicles in: {:?}", path);
            continue;
        }

        let output = document.to_xml()?;
        let description = format!("{} rewrite", document.kind());
        if apply_content_change(&path, &source, &output, &description, reviewer, dry_run)? {
            report.documents_rewritten += 1;
            report.records_updated += updated;
        }
    }

    Ok(())
}

/// Prefixes kit ids in every `carcols.meta` under `meta_dir`. A document that
/// fails to parse or validate is logged and skipped.
pub fn prefix_mod_kits(
    meta_dir: &Path,
    prefix: KitPrefix,
    reviewer: &dyn ChangeReviewer,
    dry_run: bool,
    report: &mut RunReport,
) -> Result<()> {
    info!("Prefixing mod kit ids with '{}' under: {:?}", prefix, meta_dir);

    for (path, kind) in locate_or_warn(meta_dir, &[MetaKind::ModKitList], report) {
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(err) => {
                report.warn(format!("Skipping unreadable {:?}: {}", path, err));
                continue;
            }
        };

        let mut kits = match Document::parse(&source).and_then(ModKitList::from_document) {
            Ok(kits) => kits,
            Err(err) => {
                report.warn(format!("Skipping {} at {:?}: {}", kind, path, err));
                continue;
            }
        };

        let updated = kits.apply(prefix);
        if updated == 0 {
            debug!("No kits in: {:?}", path);
            continue;
        }

        let output = kits.document.to_xml_string(LineEnding::Crlf)?;
        if apply_content_change(&path, &source, &output, "Mod kit prefix", reviewer, dry_run)? {
            report.documents_rewritten += 1;
            report.kits_prefixed += updated;
        }
    }

    Ok(())
}
