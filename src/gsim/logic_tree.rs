//! GSIM logic tree reader
//!
//! Reads the NRML `gmpeModel` logic tree: every `logicTreeBranchSet` names
//! the tectonic region it applies to, every `uncertaintyModel` inside it a
//! GSIM. Branch weights and other uncertainty types are not needed for
//! validation and are skipped.

use std::collections::BTreeSet;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LogicTreeError {
    #[error("xml parse: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    Malformed(String),
}

/// One branch set: a TRT and the GSIMs competing for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchSet {
    pub trt: String,
    pub gsims: Vec<String>,
}

/// The parts of a GSIM logic tree validation depends on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GsimLogicTree {
    pub branch_sets: Vec<BranchSet>,
}

impl GsimLogicTree {
    pub fn parse(xml: &str) -> Result<Self, LogicTreeError> {
        let mut reader = Reader::from_str(xml.trim());
        reader.config_mut().trim_text(true);

        let mut tree = GsimLogicTree::default();
        let mut current: Option<BranchSet> = None;
        let mut in_model = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"logicTreeBranchSet" => {
                        if current.is_some() {
                            return Err(LogicTreeError::Malformed(
                                "nested logicTreeBranchSet".to_string(),
                            ));
                        }
                        current = Some(BranchSet {
                            trt: branch_set_trt(&e)?,
                            gsims: Vec::new(),
                        });
                    }
                    b"uncertaintyModel" => in_model = true,
                    _ => {}
                },
                Event::Text(t) if in_model => {
                    let text = t.unescape()?;
                    let set = current.as_mut().ok_or_else(|| {
                        LogicTreeError::Malformed(
                            "uncertaintyModel outside of a logicTreeBranchSet".to_string(),
                        )
                    })?;
                    set.gsims.push(gsim_name(&text)?);
                }
                Event::End(e) => match e.local_name().as_ref() {
                    b"logicTreeBranchSet" => {
                        if let Some(set) = current.take() {
                            if set.gsims.is_empty() {
                                return Err(LogicTreeError::Malformed(format!(
                                    "the branch set for {} has no uncertaintyModel",
                                    set.trt
                                )));
                            }
                            tree.branch_sets.push(set);
                        }
                    }
                    b"uncertaintyModel" => in_model = false,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if current.is_some() {
            return Err(LogicTreeError::Malformed(
                "unterminated logicTreeBranchSet".to_string(),
            ));
        }
        if tree.branch_sets.is_empty() {
            return Err(LogicTreeError::Malformed(
                "no logicTreeBranchSet found".to_string(),
            ));
        }
        Ok(tree)
    }

    /// Tectonic region types covered by the tree
    pub fn trts(&self) -> BTreeSet<String> {
        self.branch_sets.iter().map(|set| set.trt.clone()).collect()
    }

    /// GSIM names in document order, without repetitions
    pub fn gsim_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.branch_sets
            .iter()
            .flat_map(|set| set.gsims.iter())
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect()
    }
}

fn branch_set_trt(e: &BytesStart<'_>) -> Result<String, LogicTreeError> {
    let attr = e
        .try_get_attribute("applyToTectonicRegionType")?
        .ok_or_else(|| {
            LogicTreeError::Malformed(
                "logicTreeBranchSet without applyToTectonicRegionType".to_string(),
            )
        })?;
    Ok(attr.unescape_value()?.trim().to_string())
}

/// `SadighEtAl1997` or the TOML form `[AbrahamsonEtAl2014]\nregion = "TWN"`
fn gsim_name(text: &str) -> Result<String, LogicTreeError> {
    let text = text.trim();
    let name = match text.strip_prefix('[') {
        Some(rest) => rest.split(']').next().unwrap_or_default().trim(),
        None => text,
    };
    if name.is_empty() {
        return Err(LogicTreeError::Malformed("empty uncertaintyModel".to_string()));
    }
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SADIGH_TREE: &str = r#"<nrml xmlns="http://openquake.org/xmlns/nrml/0.5">
    <logicTree logicTreeID='lt1'>
        <logicTreeBranchingLevel branchingLevelID="bl1">
            <logicTreeBranchSet uncertaintyType="gmpeModel" branchSetID="bs1"
                    applyToTectonicRegionType="Active Shallow Crust">
                <logicTreeBranch branchID="b1">
                    <uncertaintyModel>SadighEtAl1997</uncertaintyModel>
                    <uncertaintyWeight>1.0</uncertaintyWeight>
                </logicTreeBranch>
            </logicTreeBranchSet>
        </logicTreeBranchingLevel>
    </logicTree>
</nrml>"#;

    #[test]
    fn test_single_branch_set() {
        let tree = GsimLogicTree::parse(SADIGH_TREE).unwrap();
        assert_eq!(
            tree.trts().into_iter().collect::<Vec<_>>(),
            vec!["Active Shallow Crust"]
        );
        assert_eq!(tree.gsim_names(), vec!["SadighEtAl1997"]);
    }

    #[test]
    fn test_two_regions_and_toml_models() {
        let xml = r#"<nrml><logicTree logicTreeID="lt">
            <logicTreeBranchSet uncertaintyType="gmpeModel" branchSetID="a"
                applyToTectonicRegionType="Active Shallow Crust">
              <logicTreeBranch branchID="a1">
                <uncertaintyModel>[AbrahamsonEtAl2014]
                  region = "TWN"</uncertaintyModel>
                <uncertaintyWeight>0.5</uncertaintyWeight>
              </logicTreeBranch>
              <logicTreeBranch branchID="a2">
                <uncertaintyModel>BooreAtkinson2008</uncertaintyModel>
                <uncertaintyWeight>0.5</uncertaintyWeight>
              </logicTreeBranch>
            </logicTreeBranchSet>
            <logicTreeBranchSet uncertaintyType="gmpeModel" branchSetID="b"
                applyToTectonicRegionType="Stable Continental Crust">
              <logicTreeBranch branchID="b1">
                <uncertaintyModel>ToroEtAl2002</uncertaintyModel>
                <uncertaintyWeight>1.0</uncertaintyWeight>
              </logicTreeBranch>
            </logicTreeBranchSet>
        </logicTree></nrml>"#;
        let tree = GsimLogicTree::parse(xml).unwrap();
        assert_eq!(tree.branch_sets.len(), 2);
        assert_eq!(
            tree.gsim_names(),
            vec!["AbrahamsonEtAl2014", "BooreAtkinson2008", "ToroEtAl2002"]
        );
        assert!(tree.trts().contains("Stable Continental Crust"));
    }

    #[test]
    fn test_malformed_trees() {
        assert!(GsimLogicTree::parse("<nrml><logicTree>").is_err());
        assert!(GsimLogicTree::parse("<nrml></nrml>").is_err());
        let no_trt = r#"<nrml><logicTreeBranchSet>
            <uncertaintyModel>ToroEtAl2002</uncertaintyModel>
        </logicTreeBranchSet></nrml>"#;
        assert!(matches!(
            GsimLogicTree::parse(no_trt),
            Err(LogicTreeError::Malformed(_))
        ));
    }
}
