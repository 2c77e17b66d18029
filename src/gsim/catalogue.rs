//! Built-in GSIM declarations

use hazard_types::trt;
use hazard_types::IntensityMeasureComponent as Imc;

use super::GsimSignature;

/// A declaration-only ground-motion model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GsimDeclaration {
    pub name: &'static str,
    pub trt: &'static str,
    pub imts: &'static [&'static str],
    pub component: Imc,
    pub sites: &'static [&'static str],
    pub rupture: &'static [&'static str],
    pub distances: &'static [&'static str],
}

impl GsimSignature for GsimDeclaration {
    fn name(&self) -> &str {
        self.name
    }

    fn tectonic_region_type(&self) -> &str {
        self.trt
    }

    fn intensity_measure_types(&self) -> &[&'static str] {
        self.imts
    }

    fn intensity_measure_component(&self) -> Imc {
        self.component
    }

    fn required_site_parameters(&self) -> &[&'static str] {
        self.sites
    }

    fn required_rupture_parameters(&self) -> &[&'static str] {
        self.rupture
    }

    fn required_distances(&self) -> &[&'static str] {
        self.distances
    }
}

const CAV_IA: &[&str] = &["CAV", "IA"];
const CAV: &[&str] = &["CAV"];
const VS30: &[&str] = &["vs30"];
const MAG: &[&str] = &["mag"];

const fn bullock_2019(name: &'static str, trt: &'static str, component: Imc) -> GsimDeclaration {
    GsimDeclaration {
        name,
        trt,
        imts: CAV_IA,
        component,
        sites: VS30,
        rupture: MAG,
        distances: &["rjb"],
    }
}

const fn bullock_2021(name: &'static str, component: Imc) -> GsimDeclaration {
    GsimDeclaration {
        name,
        trt: trt::ACTIVE_SHALLOW_CRUST,
        imts: CAV,
        component,
        sites: VS30,
        rupture: MAG,
        distances: &["rrup"],
    }
}

const fn xu_2019(name: &'static str, trt: &'static str) -> GsimDeclaration {
    GsimDeclaration {
        name,
        trt,
        imts: CAV,
        component: Imc::GeometricMean,
        sites: VS30,
        rupture: &["mag", "hypo_depth"],
        distances: &["repi"],
    }
}

static DECLARATIONS: &[GsimDeclaration] = &[
    GsimDeclaration {
        name: "SadighEtAl1997",
        trt: trt::ACTIVE_SHALLOW_CRUST,
        imts: &["PGA", "SA"],
        component: Imc::GeometricMean,
        sites: VS30,
        rupture: &["mag", "rake"],
        distances: &["rrup"],
    },
    GsimDeclaration {
        name: "ToroEtAl2002",
        trt: trt::STABLE_CONTINENTAL,
        imts: &["PGA", "SA"],
        component: Imc::GeometricMean,
        sites: &[],
        rupture: MAG,
        distances: &["rjb"],
    },
    GsimDeclaration {
        name: "BooreAtkinson2008",
        trt: trt::ACTIVE_SHALLOW_CRUST,
        imts: &["PGA", "PGV", "SA"],
        component: Imc::AverageHorizontal,
        sites: VS30,
        rupture: &["mag", "rake"],
        distances: &["rjb"],
    },
    GsimDeclaration {
        name: "AbrahamsonSilva2008",
        trt: trt::ACTIVE_SHALLOW_CRUST,
        imts: &["PGA", "PGV", "SA"],
        component: Imc::AverageHorizontal,
        sites: &["vs30", "vs30measured", "z1pt0"],
        rupture: &["dip", "rake", "mag", "ztor", "width"],
        distances: &["rrup", "rjb", "rx"],
    },
    GsimDeclaration {
        name: "ChiouYoungs2008",
        trt: trt::ACTIVE_SHALLOW_CRUST,
        imts: &["PGA", "PGV", "SA"],
        component: Imc::AverageHorizontal,
        sites: &["vs30", "vs30measured", "z1pt0"],
        rupture: &["dip", "rake", "mag", "ztor"],
        distances: &["rrup", "rjb", "rx"],
    },
    GsimDeclaration {
        name: "CampbellBozorgnia2008",
        trt: trt::ACTIVE_SHALLOW_CRUST,
        imts: &["PGA", "PGV", "PGD", "CAV", "SA"],
        component: Imc::AverageHorizontal,
        sites: &["vs30", "z2pt5"],
        rupture: &["dip", "rake", "mag", "ztor"],
        distances: &["rrup", "rjb"],
    },
    GsimDeclaration {
        name: "AbrahamsonEtAl2014",
        trt: trt::ACTIVE_SHALLOW_CRUST,
        imts: &["PGA", "PGV", "SA"],
        component: Imc::RotD50,
        sites: &["vs30", "vs30measured", "z1pt0"],
        rupture: &["dip", "rake", "mag", "ztor", "width"],
        distances: &["rrup", "rjb", "rx", "ry0"],
    },
    xu_2019("Xu2019Shallow", trt::ACTIVE_SHALLOW_CRUST),
    xu_2019("Xu2019Deep", trt::UPPER_MANTLE),
    bullock_2019("BullockEtAl2019Asc", trt::ACTIVE_SHALLOW_CRUST, Imc::RotD50),
    bullock_2019("BullockEtAl2019SInter", trt::SUBDUCTION_INTERFACE, Imc::RotD50),
    bullock_2019("BullockEtAl2019SSlab", trt::SUBDUCTION_INTRASLAB, Imc::RotD50),
    bullock_2019("BullockEtAl2019AscRotD100", trt::ACTIVE_SHALLOW_CRUST, Imc::RotD100),
    bullock_2019("BullockEtAl2019SInterRotD100", trt::SUBDUCTION_INTERFACE, Imc::RotD100),
    bullock_2019("BullockEtAl2019SSlabRotD100", trt::SUBDUCTION_INTRASLAB, Imc::RotD100),
    bullock_2021("BullockEtAl2021V1", Imc::RotD50),
    bullock_2021("BullockEtAl2021V2j", Imc::RotD50),
    bullock_2021("BullockEtAl2021V3", Imc::RotD50),
    bullock_2021("BullockEtAl2021V4", Imc::RotD50),
    bullock_2021("BullockEtAl2021V5", Imc::RotD50),
    bullock_2021("BullockEtAl2021V6", Imc::RotD50),
    bullock_2021("BullockEtAl2021V7", Imc::RotD50),
    bullock_2021("BullockEtAl2021V8", Imc::RotD50),
    bullock_2021("BullockEtAl2021V9", Imc::RotD50),
    bullock_2021("BullockEtAl2021V1RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V2RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V3RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V4RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V5RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V6RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V7RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V8RotD100", Imc::RotD100),
    bullock_2021("BullockEtAl2021V9RotD100", Imc::RotD100),
];

/// All built-in declarations
pub fn builtin_declarations() -> impl Iterator<Item = GsimDeclaration> {
    DECLARATIONS.iter().copied()
}
