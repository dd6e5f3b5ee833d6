/// Paginated document container parsed from in-memory PDF bytes.
pub struct PageContainer {
    document: lopdf::Document,
    byte_size: usize,
}

impl PageContainer {
    /// Open a PDF container for structural access.
    pub fn load(bytes: &[u8]) -> Result<Self, String> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|error| format!("failed reading pdf container: {error}"))?;
        Ok(Self {
            document,
            byte_size: bytes.len(),
        })
    }

    /// Return PDF page count using structural access.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    /// Extract the text of every page, in page order.
    pub fn page_texts(&self) -> Result<Vec<String>, String> {
        self.document
            .get_pages()
            .keys()
            .map(|page_number| {
                self.document.extract_text(&[*page_number]).map_err(|error| {
                    format!("failed extracting text from page {page_number}: {error}")
                })
            })
            .collect()
    }

    /// Full document text: each page followed by a newline.
    pub fn full_text(&self) -> Result<String, String> {
        let mut text = String::new();
        for page in self.page_texts()? {
            text.push_str(&page);
            text.push('\n');
        }
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::PageContainer;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    /// Build a PDF with one page per entry; each string becomes its own text line.
    pub(crate) fn pdf_with_lines(pages: &[&[&str]]) -> Vec<u8> {
        let mut document = lopdf::Document::with_version("1.5");
        let pages_id = document.new_object_id();
        let font_id = document.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });

        let mut kids = Vec::new();
        for lines in pages {
            let mut operations = Vec::new();
            for (index, line) in lines.iter().enumerate() {
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 10.into()]));
                operations.push(Operation::new(
                    "Td",
                    vec![40.into(), (760 - 14 * index as i64).into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("ET", vec![]));
            }
            let content = Content { operations }
                .encode()
                .expect("encode page content");
            let content_id = document.add_object(Stream::new(dictionary! {}, content));
            let page_id = document.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                },
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        document.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        document.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        document.save_to(&mut bytes).expect("write pdf to memory");
        bytes
    }

    #[test]
    fn page_count_and_size_reflect_container() {
        let bytes = pdf_with_lines(&[&["first page"], &["second page"]]);
        let container = PageContainer::load(&bytes).expect("load pdf");

        assert_eq!(container.page_count(), 2);
        assert_eq!(container.byte_size(), bytes.len());
    }

    #[test]
    fn extracts_text_page_by_page() {
        let bytes = pdf_with_lines(&[&["Alpha line", "Beta line"], &["Gamma line"]]);
        let container = PageContainer::load(&bytes).expect("load pdf");

        let pages = container.page_texts().expect("extract page text");
        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("Alpha line"));
        assert!(pages[0].contains("Beta line"));
        assert!(pages[1].contains("Gamma line"));

        let full = container.full_text().expect("full text");
        assert!(full.find("Alpha").expect("alpha") < full.find("Gamma").expect("gamma"));
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let error = match PageContainer::load(b"not-a-pdf") {
            Ok(_) => panic!("expected load failure"),
            Err(error) => error,
        };
        assert!(error.contains("failed reading pdf container"));
    }
}
