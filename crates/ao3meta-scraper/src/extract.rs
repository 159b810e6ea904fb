//! Work metadata extraction from a listing page.
//!
//! Every field is looked up on its own: a field that cannot be found (or
//! whose text does not parse) is left out for that work only.

use select::document::Document;
use select::node::Node;
use select::predicate::{Attr, Class, Name, Not, Predicate};

use crate::schema::{Entry, Field};
use crate::table::Batch;

/// The metadata of one work blurb.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Work {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub crossover_fandoms: Vec<String>,
    pub rating: Option<String>,
    pub warning: Option<String>,
    pub pairing: Option<String>,
    pub completion_status: Option<String>,
    pub date_completion: Option<String>,
    pub freeform_tags: Vec<String>,
    pub add_warnings: Vec<String>,
    pub relationships: Vec<String>,
    pub characters: Vec<String>,
    pub summary: Option<String>,
    pub word_count: Option<u64>,
    pub chapters: Option<u64>,
    pub kudos: Option<u64>,
    pub comments: Option<u64>,
    pub bookmarks: Option<u64>,
    pub languages: Vec<String>,
    pub hits: Option<u64>,
}

impl Work {
    pub fn from_node(work: Node) -> Self {
        Self {
            id: id(work),
            title: heading_link(work).map(text),
            author: first(work, Name("a").and(Attr("rel", "author"))).map(text),
            crossover_fandoms: tags(
                work,
                Name("h5")
                    .and(Class("fandoms"))
                    .descendant(Name("a").and(Class("tag"))),
            ),
            rating: required_tag(work, 0),
            warning: required_tag(work, 1),
            pairing: required_tag(work, 2),
            completion_status: required_tag(work, 3),
            date_completion: first(work, Name("p").and(Class("datetime"))).map(text),
            freeform_tags: freeform_tags(work),
            add_warnings: tag_list(work, "warnings"),
            relationships: tag_list(work, "relationships"),
            characters: tag_list(work, "characters"),
            summary: summary(work),
            word_count: stat(work, "words").and_then(count),
            chapters: stat(work, "chapters").and_then(chapters),
            kudos: stat(work, "kudos").and_then(count),
            comments: stat_link(work, "comments").and_then(count),
            bookmarks: stat_link(work, "bookmarks").and_then(count),
            languages: tags(
                work,
                Name("dl")
                    .and(Class("stats"))
                    .descendant(Name("dd").and(Class("language"))),
            ),
            hits: stat(work, "hits").and_then(count),
        }
    }

    pub fn entry(&self, field: Field) -> Entry {
        let text = |value: &Option<String>| Entry::Scalar(value.clone().into());
        let count = |value: &Option<u64>| Entry::Scalar((*value).into());
        let list = |values: &Vec<String>| Entry::list(values.clone());

        match field {
            Field::Id => text(&self.id),
            Field::Title => text(&self.title),
            Field::Author => text(&self.author),
            Field::CrossoverFandoms => list(&self.crossover_fandoms),
            Field::Rating => text(&self.rating),
            Field::Warning => text(&self.warning),
            Field::Pairing => text(&self.pairing),
            Field::CompletionStatus => text(&self.completion_status),
            Field::DateCompletion => text(&self.date_completion),
            Field::FreeformTags => list(&self.freeform_tags),
            Field::AddWarnings => list(&self.add_warnings),
            Field::Relationships => list(&self.relationships),
            Field::Characters => list(&self.characters),
            Field::Summary => text(&self.summary),
            Field::WordCount => count(&self.word_count),
            Field::Chapters => count(&self.chapters),
            Field::Kudos => count(&self.kudos),
            Field::Comments => count(&self.comments),
            Field::Bookmarks => count(&self.bookmarks),
            Field::Languages => list(&self.languages),
            Field::Hits => count(&self.hits),
        }
    }
}

/// Every work blurb of the page, in page order.
pub fn works(document: &Document) -> impl Iterator<Item = Work> + '_ {
    document
        .find(Name("li").and(Attr("role", "article")))
        .map(Work::from_node)
}

pub fn extract_page(document: &Document) -> Batch {
    let mut batch = Batch::new();
    for work in works(document) {
        batch.push(|field| work.entry(field));
    }
    batch
}

fn first<'a, P: Predicate>(node: Node<'a>, predicate: P) -> Option<Node<'a>> {
    node.find(predicate).next()
}

fn text(node: Node) -> String {
    node.text().trim().to_string()
}

fn tags<P: Predicate>(node: Node, predicate: P) -> Vec<String> {
    node.find(predicate).map(text).collect()
}

fn heading_link(work: Node) -> Option<Node> {
    first(work, Name("h4").and(Class("heading")).descendant(Name("a")))
}

fn id(work: Node) -> Option<String> {
    let href = heading_link(work)?.attr("href")?;
    let id = match href.strip_prefix("/works/") {
        Some(id) => id,
        None => href.rsplit('/').next().unwrap_or(href),
    };
    Some(id.to_string())
}

/// Rating, warning, pairing and completion symbols, in this order.
fn required_tag(work: Node, index: usize) -> Option<String> {
    let symbols = first(work, Name("ul").and(Class("required-tags")))?;
    let symbol = symbols.find(Name("li")).nth(index)?;
    symbol.find(Name("span")).nth(1).map(text)
}

fn tag_list(work: Node, class: &'static str) -> Vec<String> {
    tags(work, Name("li").and(Class(class)).descendant(Name("a")))
}

/// Long tag lists end with a separate `freeforms last` item.
fn freeform_tags(work: Node) -> Vec<String> {
    let freeform = || Name("li").and(Class("freeforms"));
    let mut tags = tags(work, freeform().and(Not(Class("last"))).descendant(Name("a")));
    tags.extend(self::tags(
        work,
        freeform().and(Class("last")).descendant(Name("a")),
    ));
    tags
}

fn summary(work: Node) -> Option<String> {
    let quote = first(
        work,
        Name("blockquote")
            .and(Class("userstuff"))
            .and(Class("summary")),
    )?;
    let paragraphs = quote.find(Name("p")).map(|p| p.text()).collect::<Vec<_>>();
    if paragraphs.is_empty() {
        return None;
    }
    Some(paragraphs.join(" ").replace("\n\n", "\n").trim().to_string())
}

fn stat<'a>(work: Node<'a>, class: &'static str) -> Option<Node<'a>> {
    first(work, Name("dd").and(Class(class)))
}

fn stat_link<'a>(work: Node<'a>, class: &'static str) -> Option<Node<'a>> {
    first(work, Name("dd").and(Class(class)).descendant(Name("a")))
}

fn parse_count(text: &str) -> Option<u64> {
    text.trim().replace(',', "").parse().ok()
}

fn count(node: Node) -> Option<u64> {
    parse_count(&node.text())
}

/// `"3/10"` or `"3/?"`, only the published chapters are kept.
fn chapters(node: Node) -> Option<u64> {
    parse_count(node.text().split('/').next()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work(inner: &str) -> Work {
        let page = format!(r#"<ol class="work index group"><li role="article">{inner}</li></ol>"#);
        let document = Document::from(page.as_str());
        let mut works = works(&document).collect::<Vec<_>>();
        assert_eq!(1, works.len());
        works.remove(0)
    }

    #[test]
    fn bare_entry_is_all_missing() {
        assert_eq!(Work::default(), work(""));
    }

    #[test]
    fn heading() {
        let w = work(
            r#"<div class="header module"><h4 class="heading">
                 <a href="/works/31415">  A Title </a> by
                 <a rel="author" href="/users/quill/pseuds/quill">quill</a>
               </h4></div>"#,
        );
        assert_eq!(Some("31415".into()), w.id);
        assert_eq!(Some("A Title".into()), w.title);
        assert_eq!(Some("quill".into()), w.author);
    }

    #[test]
    fn id_from_other_link_shapes() {
        let w = work(r#"<h4 class="heading"><a href="https://a.org/works/abc9">T</a></h4>"#);
        assert_eq!(Some("abc9".into()), w.id);
    }

    #[test]
    fn heading_without_href_keeps_title() {
        let w = work(r#"<h4 class="heading"><a>Untitled</a></h4>"#);
        assert_eq!(None, w.id);
        assert_eq!(Some("Untitled".into()), w.title);
    }

    #[test]
    fn required_tags_by_position() {
        let w = work(
            r#"<ul class="required-tags">
                 <li><a><span class="rating-mature rating"><span class="text">Mature</span></span></a></li>
                 <li><a><span class="warning-no warnings"><span class="text">No Archive Warnings Apply</span></span></a></li>
               </ul>"#,
        );
        assert_eq!(Some("Mature".into()), w.rating);
        assert_eq!(Some("No Archive Warnings Apply".into()), w.warning);
        assert_eq!(None, w.pairing);
        assert_eq!(None, w.completion_status);
    }

    #[test]
    fn freeform_tags_joined_across_fragments() {
        let w = work(
            r#"<ul class="tags commas">
                 <li class="freeforms"><a class="tag">Fluff</a></li>
                 <li class="freeforms"><a class="tag">Angst</a></li>
                 <li class="freeforms last"><a class="tag">Happy Ending</a></li>
               </ul>"#,
        );
        assert_eq!(vec!["Fluff", "Angst", "Happy Ending"], w.freeform_tags);
    }

    #[test]
    fn freeform_tags_without_last_fragment() {
        let w = work(r#"<ul><li class="freeforms"><a class="tag">Fluff</a></li></ul>"#);
        assert_eq!(vec!["Fluff"], w.freeform_tags);
        assert_eq!(
            Entry::List(vec![crate::schema::Value::Text("Fluff".into())]),
            w.entry(Field::FreeformTags)
        );
    }

    #[test]
    fn single_freeform_tag_is_not_duplicated() {
        let w = work(r#"<ul><li class="freeforms last"><a class="tag">Fluff</a></li></ul>"#);
        assert_eq!(vec!["Fluff"], w.freeform_tags);
    }

    #[test]
    fn tag_classes_do_not_mix() {
        let w = work(
            r#"<ul class="tags commas">
                 <li class="warnings"><strong><a class="tag">Graphic Depictions Of Violence</a></strong></li>
                 <li class="relationships"><a class="tag">A/B</a></li>
                 <li class="relationships"><a class="tag">B &amp; C</a></li>
                 <li class="characters last"><a class="tag">A</a></li>
               </ul>"#,
        );
        assert_eq!(vec!["Graphic Depictions Of Violence"], w.add_warnings);
        assert_eq!(vec!["A/B", "B & C"], w.relationships);
        assert_eq!(vec!["A"], w.characters);
        assert!(w.freeform_tags.is_empty());
    }

    #[test]
    fn summary_paragraphs() {
        let w = work(
            "<blockquote class=\"userstuff summary\">\
               <p> First line.</p><p>Second\n\nline. </p>\
             </blockquote>",
        );
        assert_eq!(Some("First line. Second\nline.".into()), w.summary);
    }

    #[test]
    fn summary_without_paragraph_is_missing() {
        let w = work(r#"<blockquote class="userstuff summary">plain</blockquote>"#);
        assert_eq!(None, w.summary);
    }

    #[test]
    fn stats() {
        let w = work(
            r#"<dl class="stats">
                 <dt class="language">Language:</dt><dd class="language" lang="en">English</dd>
                 <dt class="words">Words:</dt><dd class="words">12,345</dd>
                 <dt class="chapters">Chapters:</dt><dd class="chapters"><a href="/works/1/chapters/2">3</a>/?</dd>
                 <dt class="comments">Comments:</dt><dd class="comments"><a>1,002</a></dd>
                 <dt class="kudos">Kudos:</dt><dd class="kudos"><a>87</a></dd>
                 <dt class="bookmarks">Bookmarks:</dt><dd class="bookmarks"><a>9</a></dd>
                 <dt class="hits">Hits:</dt><dd class="hits">2,000,001</dd>
               </dl>"#,
        );
        assert_eq!(vec!["English"], w.languages);
        assert_eq!(Some(12345), w.word_count);
        assert_eq!(Some(3), w.chapters);
        assert_eq!(Some(1002), w.comments);
        assert_eq!(Some(87), w.kudos);
        assert_eq!(Some(9), w.bookmarks);
        assert_eq!(Some(2_000_001), w.hits);
    }

    #[test]
    fn unparsable_count_is_missing() {
        let w = work(
            r#"<dl class="stats">
                 <dd class="words"></dd>
                 <dd class="comments">12</dd>
                 <dd class="hits">many</dd>
               </dl>"#,
        );
        assert_eq!(None, w.word_count);
        assert_eq!(None, w.comments);
        assert_eq!(None, w.hits);
    }

    #[test]
    fn language_outside_stats_is_ignored() {
        let w = work(r#"<dl><dd class="language">Deutsch</dd></dl>"#);
        assert!(w.languages.is_empty());
        assert_eq!(
            Entry::List(vec![crate::schema::Value::Missing]),
            w.entry(Field::Languages)
        );
    }
}
