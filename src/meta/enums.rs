//! Controlled-vocabulary attribute values.
//!
//! Parsing is case-insensitive and ignores surrounding whitespace.
//! Free-text values from file headers rarely match exactly, so parsers
//! normally use `parse_or_other`.

use std::fmt;

macro_rules! metadata_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Other,
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+ Self::Other];

            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other => "Other",
                }
            }

            /// Match `value` against the vocabulary.
            pub fn parse(value: &str) -> Option<Self> {
                let value = value.trim();
                Self::ALL.iter().copied().find(|v| v.name().eq_ignore_ascii_case(value))
            }

            /// Like [`parse`](Self::parse) but unknown values map to `Other`.
            pub fn parse_or_other(value: &str) -> Self {
                Self::parse(value).unwrap_or(Self::Other)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

metadata_enum!(
    /// Objective immersion medium.
    Immersion {
        Oil => "Oil",
        Water => "Water",
        WaterDipping => "WaterDipping",
        Air => "Air",
        Multi => "Multi",
        Glycerol => "Glycerol",
    }
);

metadata_enum!(
    /// Objective lens correction.
    Correction {
        Uv => "UV",
        PlanApo => "PlanApo",
        PlanFluor => "PlanFluor",
        SuperFluor => "SuperFluor",
        VioletCorrected => "VioletCorrected",
        Achro => "Achro",
        Achromat => "Achromat",
        Fluor => "Fluor",
        Fl => "Fl",
        Fluar => "Fluar",
        Neofluar => "Neofluar",
        Fluotar => "Fluotar",
        Apo => "Apo",
    }
);

metadata_enum!(
    DetectorType {
        Ccd => "CCD",
        IntensifiedCcd => "IntensifiedCCD",
        AnalogVideo => "AnalogVideo",
        Pmt => "PMT",
        Photodiode => "Photodiode",
        Spectroscopy => "Spectroscopy",
        LifetimeImaging => "LifetimeImaging",
        CorrelationSpectroscopy => "CorrelationSpectroscopy",
        Ftir => "FTIR",
        EmCcd => "EMCCD",
        Apd => "APD",
        Cmos => "CMOS",
        EbCcd => "EBCCD",
    }
);

metadata_enum!(
    /// Lasing medium.
    LaserMedium {
        Cu => "Cu",
        Ag => "Ag",
        ArFl => "ArFl",
        ArCl => "ArCl",
        KrFl => "KrFl",
        KrCl => "KrCl",
        XeFl => "XeFl",
        XeCl => "XeCl",
        XeBr => "XeBr",
        N => "N",
        Ar => "Ar",
        Kr => "Kr",
        Xe => "Xe",
        HeNe => "HeNe",
        HeCd => "HeCd",
        Co => "CO",
        Co2 => "CO2",
        H2o => "H2O",
        HFl => "HFl",
        NdGlass => "NdGlass",
        NdYag => "NdYAG",
        ErGlass => "ErGlass",
        ErYag => "ErYAG",
        HoYlf => "HoYLF",
        HoYag => "HoYAG",
        Ruby => "Ruby",
        TiSapphire => "TiSapphire",
        Alexandrite => "Alexandrite",
        Rhodamine6G => "Rhodamine6G",
        CoumarinC30 => "CoumarinC30",
        GaAs => "GaAs",
        GaAlAs => "GaAlAs",
        EMinus => "EMinus",
    }
);

metadata_enum!(
    LaserType {
        Excimer => "Excimer",
        Gas => "Gas",
        MetalVapor => "MetalVapor",
        SolidState => "SolidState",
        Dye => "Dye",
        Semiconductor => "Semiconductor",
        FreeElectron => "FreeElectron",
    }
);

metadata_enum!(
    /// Kind of experiment an image belongs to.
    ExperimentType {
        Fp => "FP",
        Fret => "FRET",
        TimeLapse => "TimeLapse",
        FourDPlus => "FourDPlus",
        Screen => "Screen",
        Immunocytochemistry => "Immunocytochemistry",
        Immunofluorescence => "Immunofluorescence",
        Fish => "FISH",
        Electrophysiology => "Electrophysiology",
        IonImaging => "IonImaging",
        Colocalization => "Colocalization",
        PgiDocumentation => "PGIDocumentation",
        FluorescenceLifetime => "FluorescenceLifetime",
        SpectralImaging => "SpectralImaging",
        Photobleaching => "Photobleaching",
    }
);
