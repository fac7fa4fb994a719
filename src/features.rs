//! Feature vocabulary: the closed set of TOI catalog columns the pipeline
//! recognizes, plus display helpers for labels and feature search.

/// Every column name a raw payload may contribute to a [`ColumnTable`].
///
/// The first block mirrors the NASA Exoplanet Archive `toi` table. The two
/// trailing names are the shorthand chart columns used by the demonstration
/// payload (see [`crate::data::fallback`]).
///
/// [`ColumnTable`]: crate::data::model::ColumnTable
pub const RECOGNIZED_COLUMNS: &[&str] = &[
    "tid", "toi", "toidisplay", "toipfx", "ctoi_alias", "pl_pnum", "tfopwg_disp",
    "st_tmag", "st_tmagerr1", "st_tmagerr2", "st_tmagsymerr", "st_tmaglim",
    "rastr", "ra", "raerr1", "raerr2", "rasymerr", "decstr", "dec", "decerr1",
    "decerr2", "decsymerr", "st_pmra", "st_pmraerr1", "st_pmraerr2", "st_pmrasymerr",
    "st_pmralim", "st_pmdec", "st_pmdecerr1", "st_pmdecerr2", "st_pmdecsymerr",
    "st_pmdeclim", "pl_tranmid", "pl_tranmiderr1", "pl_tranmiderr2", "pl_tranmidsymerr",
    "pl_tranmidlim", "pl_orbper", "pl_orbpererr1", "pl_orbpererr2", "pl_orbpersymerr",
    "pl_orbperlim", "pl_trandurh", "pl_trandurherr1", "pl_trandurherr2", "pl_trandurhsymerr",
    "pl_trandurhlim", "pl_trandep", "pl_trandeperr1", "pl_trandeperr2", "pl_trandepsymerr",
    "pl_trandeplim", "pl_rade", "pl_radeerr1", "pl_radeerr2", "pl_radesymerr", "pl_radelim",
    "pl_insol", "pl_insolerr1", "pl_insolerr2", "pl_insolsymerr", "pl_insollim", "pl_eqt",
    "pl_eqterr1", "pl_eqterr2", "pl_eqtsymerr", "pl_eqtlim", "st_dist", "st_disterr1",
    "st_disterr2", "st_distsymerr", "st_distlim", "st_teff", "st_tefferr1", "st_tefferr2",
    "st_teffsymerr", "st_tefflim", "st_logg", "st_loggerr1", "st_loggerr2", "st_loggsymerr",
    "st_logglim", "st_rad", "st_raderr1", "st_raderr2", "st_radsymerr", "st_radlim",
    "sectors", "toi_created", "rowupdate", "release_date",
    // chart shorthands
    "pl_trandur", "pl_temp",
];

/// Features offered for the chart axes, with their axis labels.
pub const CHART_FEATURES: &[(&str, &str)] = &[
    ("pl_orbper", "Orbital Period (days)"),
    ("pl_trandur", "Transit Duration (hours)"),
    ("pl_trandep", "Transit Depth (ppm)"),
    ("pl_temp", "Temperature (K)"),
    ("pl_tranmid", "Transit Mid (JD)"),
];

/// Whether `name` belongs to [`RECOGNIZED_COLUMNS`].
pub fn is_recognized(name: &str) -> bool {
    RECOGNIZED_COLUMNS.contains(&name)
}

/// Position of `name` in [`RECOGNIZED_COLUMNS`], used to order columns for display.
pub fn vocabulary_rank(name: &str) -> Option<usize> {
    RECOGNIZED_COLUMNS.iter().position(|c| *c == name)
}

/// Turn a column key into a human-readable title: `pl_orbper` → `Pl Orbper`.
pub fn prettify_key(key: &str) -> String {
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Axis label for a feature: the chart label when one is defined, otherwise
/// the prettified key.
pub fn axis_label(key: &str) -> String {
    CHART_FEATURES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| prettify_key(key))
}

/// Case-insensitive substring search over a feature list. Order is preserved
/// and an empty search matches everything.
pub fn matching_features<'a, I>(features: I, search: &str) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = search.trim().to_lowercase();
    features
        .into_iter()
        .filter(|f| f.to_lowercase().contains(&needle))
        .collect()
}
