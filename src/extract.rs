//! Price-list extraction from uploaded documents.
//!
//! Extraction runs in two stages:
//!
//! 1. **Decode** the document into plain text lines. Plain text and CSV are
//!    read as UTF-8, PDFs through `pdf-extract`, and XLSX workbooks are read
//!    row by row (each spreadsheet row becomes one line). A document that
//!    cannot be decoded is the only fatal outcome ([`ExtractionError`]).
//! 2. **Parse** each line into a `(name, price, promotion)` entry. Parsing is
//!    best effort: lines that do not yield an entry are counted as skipped.
//!
//! # Line rules
//!
//! - The last monetary amount on a line is the current price. A higher
//!   amount before it is a crossed-out previous price and marks the entry
//!   as a promotion (`de R$ 12,90 por R$ 9,90`).
//! - Explicit markers (`oferta`, `promoção`, `leve 3 pague 2`, `-20%`, ...)
//!   also mark a promotion and are removed from the product text.
//! - A product line without a price is joined with the following line when
//!   that line carries an amount but is not a complete entry on its own.
//! - Repeated `(name, price)` pairs within one document are dropped.

use std::collections::HashSet;
use std::io::{Cursor, Read};
use std::path::Path;

use crate::error::ExtractionError;
use crate::models::Cents;
use crate::money::{find_amounts, Amount};
use crate::normalize::fold;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_CSV: &str = "text/csv";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Maximum sheets to process in an xlsx.
const XLSX_MAX_SHEETS: usize = 100;
/// Maximum rows to process per sheet.
const XLSX_MAX_ROWS_PER_SHEET: usize = 100_000;
/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Words that introduce a price rather than describe the product.
const PRICE_CONNECTORS: &[&str] = &[
    "de", "por", "apenas", "so", "from", "for", "was", "now", "only", "just",
];

const PROMOTION_MARKERS: &[&str] = &[
    "promocao", "promocional", "promo", "oferta", "ofertas", "desconto", "descontos", "leve",
    "pague", "imperdivel", "liquidacao", "sale", "off", "discount", "deal",
];

/// Tokens that only appear on page furniture (validity notes, page numbers,
/// disclaimers). A line containing one is never a product.
const LAYOUT_MARKERS: &[&str] = &[
    "validade", "valido", "valida", "validos", "validas", "vigencia", "pagina", "caderno",
    "encarte", "imagens", "ilustrativas", "estoque", "page", "valid",
];

/// Tunables for line parsing.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Lowest accepted price (cents).
    pub min_price_cents: Cents,
    /// Highest accepted price (cents).
    pub max_price_cents: Cents,
    /// Minimum number of letters a product name must contain.
    pub min_name_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            min_price_cents: 1,
            max_price_cents: 999_999,
            min_name_chars: 3,
        }
    }
}

/// One price-list entry as found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub name: String,
    pub price: Cents,
    pub promotion: bool,
}

/// Outcome of extracting one document.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub supermarket: String,
    pub entries: Vec<RawEntry>,
    /// Non-blank lines seen.
    pub lines_total: usize,
    /// Lines that did not contribute to any entry.
    pub skipped: usize,
    /// Entries dropped because the same name and price appeared earlier.
    pub duplicates: usize,
}

impl Extraction {
    pub fn accepted(&self) -> usize {
        self.entries.len()
    }
}

/// Decodes `document` and extracts its price-list entries.
///
/// Fails only when the document cannot be decoded at all; an empty or
/// unparseable document yields zero entries with every line skipped.
pub fn extract(
    document: &[u8],
    content_type: &str,
    supermarket: &str,
    opts: &ExtractOptions,
) -> Result<Extraction, ExtractionError> {
    let text = extract_text(document, content_type)?;
    let parsed = parse_price_list(&text, opts);
    Ok(Extraction {
        supermarket: supermarket.to_string(),
        entries: parsed.entries,
        lines_total: parsed.lines_total,
        skipped: parsed.skipped,
        duplicates: parsed.duplicates,
    })
}

/// Maps a file extension to the content type used by [`extract`].
pub fn content_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "txt" | "text" => Some(MIME_TEXT),
        "csv" => Some(MIME_CSV),
        "pdf" => Some(MIME_PDF),
        "xlsx" => Some(MIME_XLSX),
        _ => None,
    }
}

/// Decodes a document into text, one logical line per `\n`.
pub fn extract_text(bytes: &[u8], content_type: &str) -> Result<String, ExtractionError> {
    // Drop parameters such as `; charset=utf-8`.
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.as_str() {
        MIME_TEXT | MIME_CSV => Ok(std::str::from_utf8(bytes)?.to_string()),
        MIME_PDF => extract_pdf(bytes),
        MIME_XLSX => extract_xlsx(bytes),
        _ => Err(ExtractionError::UnsupportedContentType(
            content_type.to_string(),
        )),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))
}

fn sheet_err(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Spreadsheet(e.to_string())
}

fn read_zip_entry_bounded(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
    name: &str,
    max_bytes: u64,
) -> Result<Vec<u8>, ExtractionError> {
    let entry = archive.by_name(name).map_err(sheet_err)?;
    let mut out = Vec::new();
    entry
        .take(max_bytes)
        .read_to_end(&mut out)
        .map_err(sheet_err)?;
    if out.len() as u64 >= max_bytes {
        return Err(ExtractionError::Spreadsheet(format!(
            "ZIP entry {} exceeds size limit ({} bytes)",
            name, max_bytes
        )));
    }
    Ok(out)
}

fn extract_xlsx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(sheet_err)?;

    // Workbooks holding only numbers have no shared-strings part.
    let has_shared = archive
        .file_names()
        .any(|n| n == "xl/sharedStrings.xml");
    let shared_strings = if has_shared {
        read_shared_strings(&mut archive)?
    } else {
        Vec::new()
    };

    let mut sheet_names: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|s| s.to_string())
        .collect();
    if sheet_names.is_empty() {
        return Err(ExtractionError::Spreadsheet(
            "workbook has no worksheets".to_string(),
        ));
    }
    sheet_names.sort_by_key(|name| {
        name.trim_start_matches("xl/worksheets/sheet")
            .trim_end_matches(".xml")
            .parse::<u32>()
            .unwrap_or(u32::MAX)
    });

    let mut lines = Vec::new();
    for name in sheet_names.into_iter().take(XLSX_MAX_SHEETS) {
        let xml = read_zip_entry_bounded(&mut archive, &name, MAX_XML_ENTRY_BYTES)?;
        lines.extend(sheet_rows(&xml, &shared_strings)?);
    }
    Ok(lines.join("\n"))
}

fn read_shared_strings(
    archive: &mut zip::ZipArchive<Cursor<&[u8]>>,
) -> Result<Vec<String>, ExtractionError> {
    use quick_xml::events::Event;

    let xml = read_zip_entry_bounded(archive, "xl/sharedStrings.xml", MAX_XML_ENTRY_BYTES)?;
    let mut reader = quick_xml::Reader::from_reader(xml.as_slice());
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut in_t = false;
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => in_t = true,
                _ => {}
            },
            Ok(Event::Text(te)) if in_t => {
                if let Some(s) = current.as_mut() {
                    s.push_str(&te.unescape().unwrap_or_default());
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"si" => strings.extend(current.take()),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(sheet_err(e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Reads one worksheet and returns each non-empty row as a space-joined line.
fn sheet_rows(xml: &[u8], shared_strings: &[String]) -> Result<Vec<String>, ExtractionError> {
    use quick_xml::events::Event;

    #[derive(Clone, Copy, PartialEq)]
    enum CellKind {
        Shared,
        Inline,
        Number,
    }

    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut kind = CellKind::Number;
    let mut in_value = false;
    loop {
        if rows.len() >= XLSX_MAX_ROWS_PER_SHEET {
            break;
        }
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => {
                    kind = CellKind::Number;
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"t" {
                            kind = match attr.value.as_ref() {
                                b"s" => CellKind::Shared,
                                b"inlineStr" | b"str" => CellKind::Inline,
                                _ => CellKind::Number,
                            };
                        }
                    }
                }
                b"v" | b"t" => in_value = true,
                _ => {}
            },
            Ok(Event::Text(te)) if in_value => {
                let raw = te.unescape().unwrap_or_default();
                let raw = raw.trim();
                let cell = match kind {
                    CellKind::Shared => raw
                        .parse::<usize>()
                        .ok()
                        .and_then(|i| shared_strings.get(i).cloned()),
                    CellKind::Inline => Some(raw.to_string()),
                    CellKind::Number => Some(format_number_cell(raw)),
                };
                if let Some(cell) = cell.filter(|c| !c.is_empty()) {
                    row.push(cell);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"row" if !row.is_empty() => rows.push(row.join(" ")),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(sheet_err(e)),
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

/// Spreadsheets store `12,90` as the float `12.9` and `25,00` as `25`;
/// render numbers with two decimals so the amount scanner recognizes them.
fn format_number_cell(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => format!("{:.2}", v),
        _ => raw.to_string(),
    }
}

/// Line-parsing result, before it is tied to a supermarket.
#[derive(Debug, Clone, Default)]
pub struct ParsedList {
    pub entries: Vec<RawEntry>,
    pub lines_total: usize,
    pub skipped: usize,
    pub duplicates: usize,
}

/// Parses decoded text into price-list entries.
pub fn parse_price_list(text: &str, opts: &ExtractOptions) -> ParsedList {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut out = ParsedList {
        lines_total: lines.len(),
        ..ParsedList::default()
    };
    let mut seen: HashSet<(String, Cents)> = HashSet::new();

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if is_layout_noise(line) {
            out.skipped += 1;
            i += 1;
            continue;
        }

        let (entry, consumed) = match parse_entry(line, opts) {
            Some(entry) => (Some(entry), 1),
            None => match lines.get(i + 1) {
                Some(next) if continues_entry(next, opts) => {
                    match parse_entry(&format!("{} {}", line, next), opts) {
                        Some(entry) => (Some(entry), 2),
                        None => (None, 1),
                    }
                }
                _ => (None, 1),
            },
        };

        match entry {
            Some(entry) => {
                if seen.insert((entry.name.to_lowercase(), entry.price)) {
                    out.entries.push(entry);
                } else {
                    out.duplicates += 1;
                }
            }
            None => out.skipped += consumed,
        }
        i += consumed;
    }

    out
}

/// A follow-up line can complete a nameless price: it carries an amount
/// but is not an entry by itself.
fn continues_entry(next: &str, opts: &ExtractOptions) -> bool {
    !is_layout_noise(next)
        && !find_amounts(next).is_empty()
        && parse_entry(next, opts).is_none()
}

fn is_layout_noise(line: &str) -> bool {
    if !line.chars().any(char::is_alphabetic) {
        // Bare amounts are not noise: they may complete the previous line.
        return find_amounts(line).is_empty();
    }
    fold(line)
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| LAYOUT_MARKERS.contains(&w))
}

/// Parses a single line into an entry, if it holds a price and a name.
pub fn parse_entry(line: &str, opts: &ExtractOptions) -> Option<RawEntry> {
    let amounts = find_amounts(line);
    let in_range: Vec<&Amount> = amounts
        .iter()
        .filter(|a| (opts.min_price_cents..=opts.max_price_cents).contains(&a.cents))
        .collect();
    // `0,50 kg` next to a price is a weight; on its own it is a price per unit.
    let priced: Vec<&Amount> = if in_range.iter().any(|a| !a.per_unit) {
        in_range.into_iter().filter(|a| !a.per_unit).collect()
    } else {
        in_range
    };
    let price = priced.last()?.cents;
    let crossed_out = priced.len() >= 2 && priced[priced.len() - 2].cents > price;

    let (name, marked) = product_text(line, &amounts);
    let letters = name.chars().filter(|c| c.is_alphabetic()).count();
    if letters < opts.min_name_chars {
        return None;
    }

    Some(RawEntry {
        name,
        price,
        promotion: crossed_out || marked,
    })
}

/// Removes amounts, price connectors, and promotion markers from `line`.
///
/// Returns the cleaned product text and whether a promotion marker was seen.
fn product_text(line: &str, amounts: &[Amount]) -> (String, bool) {
    let mut pieces: Vec<&str> = Vec::with_capacity(amounts.len() + 1);
    let mut cursor = 0;
    for a in amounts {
        pieces.push(strip_trailing_connector(&line[cursor..a.start]));
        cursor = a.end;
    }
    pieces.push(&line[cursor..]);

    let mut marked = false;
    let mut words: Vec<String> = Vec::new();
    for word in pieces.iter().flat_map(|p| p.split_whitespace()) {
        if is_percentage(word) {
            marked = true;
            continue;
        }
        let cleaned = clean_word(word);
        if cleaned.is_empty() {
            continue;
        }
        if PROMOTION_MARKERS.contains(&fold(&cleaned).as_str()) {
            marked = true;
            continue;
        }
        words.push(cleaned);
    }

    (words.join(" "), marked)
}

fn strip_trailing_connector(segment: &str) -> &str {
    let trimmed = segment.trim_end();
    let last = trimmed.split_whitespace().next_back().unwrap_or_default();
    let last_start = trimmed.len() - last.len();
    if PRICE_CONNECTORS.contains(&fold(last).as_str()) {
        &trimmed[..last_start]
    } else {
        trimmed
    }
}

/// `20%`, `-30%`, `20%off`.
fn is_percentage(word: &str) -> bool {
    let core = word.trim_start_matches(['-', '+']);
    match core.split_once('%') {
        Some((num, _)) => !num.is_empty() && num.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Strips punctuation from a word, keeping `,` and `.` between digits.
fn clean_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len());
    for (i, &c) in chars.iter().enumerate() {
        let between_digits = i > 0
            && i + 1 < chars.len()
            && chars[i - 1].is_ascii_digit()
            && chars[i + 1].is_ascii_digit();
        if c.is_alphanumeric() || ((c == ',' || c == '.') && between_digits) {
            out.push(c);
        } else if c == '-' && !out.is_empty() && i + 1 < chars.len() {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ExtractOptions {
        ExtractOptions::default()
    }

    #[test]
    fn unsupported_content_type_returns_error() {
        let err = extract(b"foo", "application/octet-stream", "acme", &opts()).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedContentType(_)));
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract(b"not a pdf", MIME_PDF, "acme", &opts()).unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)));
    }

    #[test]
    fn invalid_zip_returns_error_for_xlsx() {
        let err = extract(b"not a zip", MIME_XLSX, "acme", &opts()).unwrap_err();
        assert!(matches!(err, ExtractionError::Spreadsheet(_)));
    }

    #[test]
    fn invalid_utf8_text_returns_error() {
        let err = extract(&[0xff, 0xfe, 0x00], MIME_TEXT, "acme", &opts()).unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding(_)));
    }

    #[test]
    fn content_type_parameters_are_ignored() {
        let ex = extract(b"Arroz 5kg 24,90", "text/plain; charset=utf-8", "acme", &opts()).unwrap();
        assert_eq!(ex.accepted(), 1);
    }

    #[test]
    fn empty_document_yields_nothing() {
        let ex = extract(b"", MIME_TEXT, "acme", &opts()).unwrap();
        assert_eq!(ex.accepted(), 0);
        assert_eq!(ex.lines_total, 0);
        assert_eq!(ex.skipped, 0);
    }

    #[test]
    fn unparseable_document_skips_every_line() {
        let doc = "Nothing to see here\nJust words\n*** ***\nPágina 3";
        let ex = extract(doc.as_bytes(), MIME_TEXT, "acme", &opts()).unwrap();
        assert_eq!(ex.accepted(), 0);
        assert_eq!(ex.lines_total, 4);
        assert_eq!(ex.skipped, ex.lines_total);
    }

    #[test]
    fn parses_a_typical_flyer() {
        let doc = "\
SUPERMERCADO BOM PREÇO
Ofertas válidas de 01/05 a 07/05
Arroz Tio João 5kg R$ 24,90
Feijão Carioca 1kg
R$ 7,49
OFERTA Leite Integral 1L 4,99
Café Pilão 500g de R$ 18,90 por R$ 15,90
Página 1
";
        let ex = extract(doc.as_bytes(), MIME_TEXT, "bompreco", &opts()).unwrap();
        assert_eq!(ex.supermarket, "bompreco");
        assert_eq!(ex.lines_total, 8);
        assert_eq!(
            ex.entries,
            vec![
                RawEntry {
                    name: "Arroz Tio João 5kg".into(),
                    price: 2_490,
                    promotion: false,
                },
                RawEntry {
                    name: "Feijão Carioca 1kg".into(),
                    price: 749,
                    promotion: false,
                },
                RawEntry {
                    name: "Leite Integral 1L".into(),
                    price: 499,
                    promotion: true,
                },
                RawEntry {
                    name: "Café Pilão 500g".into(),
                    price: 1_590,
                    promotion: true,
                },
            ]
        );
        assert_eq!(ex.skipped, 3);
        assert_eq!(ex.duplicates, 0);
    }

    #[test]
    fn does_not_glue_two_complete_entries() {
        let doc = "Macarrão Espaguete\nÓleo de Soja 900ml 7,49";
        let parsed = parse_price_list(doc, &opts());
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].name, "Óleo de Soja 900ml");
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn higher_later_price_is_not_a_promotion() {
        let entry = parse_entry("Azeite 500ml 19,90 29,90", &opts()).unwrap();
        assert_eq!(entry.price, 2_990);
        assert!(!entry.promotion);
    }

    #[test]
    fn weight_next_to_a_price_is_not_the_price() {
        let entry = parse_entry("Queijo Mussarela 29,90 0,50 kg", &opts()).unwrap();
        assert_eq!(
            entry,
            RawEntry {
                name: "Queijo Mussarela".into(),
                price: 2_990,
                promotion: false,
            }
        );

        let per_kg = parse_entry("Banana Prata 4,99 kg", &opts()).unwrap();
        assert_eq!(per_kg.name, "Banana Prata");
        assert_eq!(per_kg.price, 499);
    }

    #[test]
    fn percentage_marks_promotion() {
        let entry = parse_entry("Sabão em Pó -20% 12,90", &opts()).unwrap();
        assert_eq!(entry.name, "Sabão em Pó");
        assert!(entry.promotion);
    }

    #[test]
    fn out_of_range_prices_are_ignored() {
        let narrow = ExtractOptions {
            max_price_cents: 10_000,
            ..opts()
        };
        assert!(parse_entry("Televisor 55 R$ 2.999,00", &narrow).is_none());
        assert!(parse_entry("Brinde 0,00", &opts()).is_none());
    }

    #[test]
    fn short_names_are_rejected() {
        assert!(parse_entry("R$ 4,99", &opts()).is_none());
        assert!(parse_entry("AB 4,99", &opts()).is_none());
    }

    #[test]
    fn duplicates_are_counted_once() {
        let doc = "Arroz 5kg 24,90\nArroz 5kg 24,90\nARROZ 5KG 24,90\nArroz 5kg 23,90";
        let parsed = parse_price_list(doc, &opts());
        assert_eq!(parsed.entries.len(), 2);
        assert_eq!(parsed.duplicates, 2);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn both_separator_styles_in_one_document() {
        let doc = "Vinho Tinto 1.234,56\nWhisky 12 anos 1,234.56";
        let parsed = parse_price_list(doc, &opts());
        assert_eq!(parsed.entries.len(), 2);
        assert!(parsed.entries.iter().all(|e| e.price == 123_456));
    }

    #[test]
    fn csv_rows_parse() {
        let doc = "produto;preco\nArroz 5kg;24,90\nFeijão 1kg;7,49";
        let ex = extract(doc.as_bytes(), MIME_CSV, "acme", &opts()).unwrap();
        assert_eq!(ex.accepted(), 2);
        assert_eq!(ex.entries[1].name, "Feijão 1kg");
        assert_eq!(ex.skipped, 1);
    }

    #[test]
    fn whole_number_price_cells_parse() {
        let xml = br#"<worksheet><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Arroz Tipo 1 5kg</t></is></c><c r="B1"><v>25</v></c></row>
</sheetData></worksheet>"#;
        let rows = sheet_rows(xml, &[]).unwrap();
        assert_eq!(rows, vec!["Arroz Tipo 1 5kg 25.00"]);

        let parsed = parse_price_list(&rows.join("\n"), &opts());
        assert_eq!(parsed.entries.len(), 1);
        assert_eq!(parsed.entries[0].price, 2_500);
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn content_types_from_extensions() {
        assert_eq!(content_type_for_path(Path::new("a/flyer.PDF")), Some(MIME_PDF));
        assert_eq!(content_type_for_path(Path::new("list.xlsx")), Some(MIME_XLSX));
        assert_eq!(content_type_for_path(Path::new("list.txt")), Some(MIME_TEXT));
        assert_eq!(content_type_for_path(Path::new("list.docx")), None);
    }

    #[test]
    fn number_cells_keep_two_decimals() {
        assert_eq!(format_number_cell("12.9"), "12.90");
        assert_eq!(format_number_cell("25"), "25.00");
        assert_eq!(format_number_cell("abc"), "abc");
        assert_eq!(format_number_cell("NaN"), "NaN");
    }
}
