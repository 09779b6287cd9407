use scala_notemap::note_map::NoteMap;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum NoteMapFileDto {
    NoteMap(NoteMapDto),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NoteMapDto {
    pub description: String,
    pub center_note: i32,
    pub center_frequency: f64,
    pub items: Vec<NoteMapItemDto>,
}

impl NoteMapDto {
    pub fn from_note_map(description: impl Into<String>, note_map: &NoteMap) -> Self {
        let config = note_map.config();
        Self {
            description: description.into(),
            center_note: config.center_note,
            center_frequency: config.center_frequency,
            items: (0..note_map.size())
                .map(|index| {
                    let note = index as i32;
                    NoteMapItemDto {
                        note,
                        ratio: note_map.ratio_of(note),
                        frequency_in_hz: note_map.frequency_of(note),
                    }
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NoteMapItemDto {
    pub note: i32,
    pub ratio: f64,
    pub frequency_in_hz: f64,
}
