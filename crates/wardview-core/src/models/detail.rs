use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::index::{Section, Subsection};

use super::null_as_default;

/// Full patient record as returned by `GET /pacientes/{dni}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    pub dni: String,
    #[serde(rename = "nombre", default)]
    pub name: Option<String>,
    #[serde(rename = "apellidoPaterno", default)]
    pub paternal_surname: Option<String>,
    #[serde(rename = "apellidoMaterno", default)]
    pub maternal_surname: Option<String>,
    #[serde(rename = "sexo", default)]
    pub sex: Option<String>,
    #[serde(rename = "fecNac", default)]
    pub birth_date: Option<String>,
    #[serde(rename = "edad", default)]
    pub age: Option<u32>,
    #[serde(rename = "lugarNac", default)]
    pub birthplace: Option<String>,
    #[serde(default)]
    pub religion: Option<String>,
    #[serde(rename = "direccion", default)]
    pub address: Option<String>,
    #[serde(rename = "grupoSanguineo", default)]
    pub blood_group: Option<String>,
    #[serde(rename = "estCivil", default)]
    pub marital_status: Option<String>,
    #[serde(rename = "factorRH", default)]
    pub rh_factor: Option<String>,
    #[serde(rename = "gradoInst", default)]
    pub education: Option<String>,
    #[serde(rename = "ocupacion", default)]
    pub occupation: Option<String>,
    #[serde(rename = "familiarEncargado", default)]
    pub responsible_relative: Option<String>,
    #[serde(rename = "estadoActual", default)]
    pub current_status: Option<String>,
    #[serde(rename = "cama", default)]
    pub bed: Option<String>,
    #[serde(rename = "historiaEnfermedad", default)]
    pub illness_history: Option<IllnessHistory>,
    #[serde(default)]
    pub anamnesis: Option<String>,
    #[serde(rename = "funcionesBiologicas", default)]
    pub biological_functions: Option<BiologicalFunctions>,
    #[serde(rename = "antecedentes", default)]
    pub background: Option<Background>,
    #[serde(rename = "examenFisico", default)]
    pub physical_exam: Option<PhysicalExam>,
    #[serde(rename = "evolucion", default, deserialize_with = "null_as_default")]
    pub evolution: Vec<EvolutionNote>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IllnessHistory {
    #[serde(rename = "fechaIngreso", default)]
    pub admission_date: Option<String>,
    #[serde(rename = "fechaHasta", default)]
    pub until_date: Option<String>,
    #[serde(rename = "tiempoEnfermedad", default)]
    pub duration: Option<String>,
    #[serde(rename = "formaInicio", default)]
    pub onset: Option<String>,
    #[serde(rename = "curso", default)]
    pub course: Option<String>,
    #[serde(rename = "sintomas", default)]
    pub symptoms: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BiologicalFunctions {
    #[serde(rename = "apetito", default)]
    pub appetite: Option<String>,
    #[serde(rename = "deposicion", default)]
    pub bowel: Option<String>,
    #[serde(rename = "sed", default)]
    pub thirst: Option<String>,
    #[serde(rename = "sueno", alias = "sueño", default)]
    pub sleep: Option<String>,
    #[serde(rename = "miccion", default)]
    pub urination: Option<String>,
    #[serde(rename = "deseoSexual", default)]
    pub sexual_desire: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Background {
    #[serde(rename = "personales", default)]
    pub personal: Option<String>,
    #[serde(rename = "historiaAcademica", default)]
    pub academic_history: Option<String>,
    #[serde(rename = "judiciales", default)]
    pub judicial: Option<String>,
    /// Free-form; the backend sends whatever structure the form produced.
    #[serde(rename = "patologicos", default)]
    pub pathological: Value,
    #[serde(rename = "familiares", default)]
    pub family: Value,
    #[serde(rename = "personalidadPrevia", default)]
    pub previous_personality: Option<String>,
    #[serde(rename = "socioeconomicos", default)]
    pub socioeconomic: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicalExam {
    #[serde(rename = "funcionesVitales", default)]
    pub vital_signs: Value,
    #[serde(rename = "examenGeneral", default)]
    pub general: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvolutionNote {
    #[serde(rename = "titulo", default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "fecha", default)]
    pub date: Option<String>,
    #[serde(rename = "hora", default)]
    pub time: Option<String>,
    #[serde(rename = "contenido", default, deserialize_with = "null_as_default")]
    pub content: String,
}

// Section ids used as scroll anchors by the record view.
pub const SECTION_IDENTIFICATION: &str = "filiacion";
pub const SECTION_ILLNESS: &str = "historia-enfermedad";
pub const SECTION_ANAMNESIS: &str = "anamnesis";
pub const SECTION_BIOLOGICAL: &str = "funciones-biologicas";
pub const SECTION_BACKGROUND: &str = "antecedentes";
pub const SECTION_PHYSICAL_EXAM: &str = "examen-fisico";
pub const SECTION_EVOLUTION: &str = "evolucion";

/// Subsections of "Antecedentes", in display order.
pub const BACKGROUND_SUBSECTIONS: [(&str, &str); 7] = [
    ("antecedentes-personales", "Personales"),
    ("antecedentes-academica", "Historia académica"),
    ("antecedentes-judiciales", "Judiciales"),
    ("antecedentes-patologicos", "Patológicos"),
    ("antecedentes-familiares", "Familiares"),
    ("antecedentes-personalidad", "Personalidad previa"),
    ("antecedentes-socioeconomicos", "Socioeconómicos"),
];

/// Subsections of "Examen físico", in display order.
pub const PHYSICAL_EXAM_SUBSECTIONS: [(&str, &str); 2] = [
    ("examen-funciones-vitales", "Funciones vitales"),
    ("examen-general", "Examen general"),
];

impl PatientDetail {
    pub fn full_name(&self) -> String {
        [&self.name, &self.paternal_surname, &self.maternal_surname]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty() && *s != "null")
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Anchor id for the n-th evolution note.
    pub fn evolution_anchor(index: usize) -> String {
        format!("{}-{}", SECTION_EVOLUTION, index)
    }

    /// Build the record index shown in the sidebar.
    pub fn sections(&self) -> Vec<Section> {
        let admission = self
            .illness_history
            .as_ref()
            .and_then(|h| h.admission_date.clone());

        let evolution_subsections = self
            .evolution
            .iter()
            .enumerate()
            .map(|(i, note)| Subsection {
                id: Self::evolution_anchor(i),
                title: if note.title.trim().is_empty() {
                    format!("Nota {}", i + 1)
                } else {
                    note.title.clone()
                },
                date: note.date.clone(),
                modified: None,
            })
            .collect();

        vec![
            Section::new(SECTION_IDENTIFICATION, "Datos de filiación"),
            Section {
                date: admission,
                ..Section::new(SECTION_ILLNESS, "Historia de la enfermedad")
            },
            Section::new(SECTION_ANAMNESIS, "Anamnesis"),
            Section::new(SECTION_BIOLOGICAL, "Funciones biológicas"),
            Section::with_subsections(SECTION_BACKGROUND, "Antecedentes", &BACKGROUND_SUBSECTIONS),
            Section::with_subsections(SECTION_PHYSICAL_EXAM, "Examen físico", &PHYSICAL_EXAM_SUBSECTIONS),
            Section {
                subsections: evolution_subsections,
                ..Section::new(SECTION_EVOLUTION, "Evolución")
            },
        ]
    }
}
