use serde::Serialize;

/// A dataset exposed by the API and the statement its rows are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dataset {
    pub name: &'static str,
    pub base_select: &'static str,
}

pub const DATASETS: &[Dataset] = &[
    Dataset {
        name: "population",
        base_select: "SELECT * FROM public.population_master",
    },
    Dataset {
        name: "populationjoined",
        base_select: "SELECT * FROM public.population_master pm \
                      LEFT JOIN public.shielding_master sm USING (nhs_number)",
    },
    Dataset {
        name: "populationshielding",
        base_select: "SELECT * FROM public.population_shielding",
    },
];

impl Dataset {
    pub fn find(name: &str) -> Option<&'static Dataset> {
        DATASETS.iter().find(|d| d.name == name)
    }

    pub fn all() -> &'static [Dataset] {
        DATASETS
    }
}
