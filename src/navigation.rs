//! The navigation bar shown at the top of every page, and along the bottom on
//! small screens.

use maud::{Markup, html};

use crate::endpoints;

/// The top level areas of the app that have a link in the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Cards,
    Categories,
}

impl Section {
    const ALL: [Section; 2] = [Section::Cards, Section::Categories];

    /// The section a page belongs to, pages for a single card and its
    /// purchases sit under the cards section.
    fn of(endpoint: &str) -> Option<Self> {
        match endpoint {
            endpoints::CARDS_VIEW
            | endpoints::CARD_VIEW
            | endpoints::NEW_CARD_VIEW
            | endpoints::EDIT_CARD_VIEW
            | endpoints::NEW_TRANSACTION_VIEW => Some(Section::Cards),
            endpoints::CATEGORIES_VIEW => Some(Section::Categories),
            _ => None,
        }
    }

    fn url(self) -> &'static str {
        match self {
            Section::Cards => endpoints::CARDS_VIEW,
            Section::Categories => endpoints::CATEGORIES_VIEW,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Section::Cards => "Cards",
            Section::Categories => "Categories",
        }
    }
}

const WIDE_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-gray-900 \
    hover:bg-gray-100 lg:hover:bg-transparent lg:hover:text-blue-700 \
    dark:text-white lg:dark:hover:text-blue-500 dark:hover:bg-gray-700";
const WIDE_CURRENT_LINK_STYLE: &str = "block py-2 px-3 rounded-sm lg:p-0 text-white \
    bg-blue-700 lg:bg-transparent lg:text-blue-700 lg:dark:text-blue-500";

const NARROW_LINK_STYLE: &str = "flex items-center justify-center rounded-lg px-3 py-2 \
    text-sm font-semibold text-gray-600 hover:text-blue-700 dark:text-gray-300";
const NARROW_CURRENT_LINK_STYLE: &str = "flex items-center justify-center rounded-lg px-3 py-2 \
    text-sm font-semibold bg-blue-50 text-blue-700 dark:bg-blue-900/30 dark:text-blue-200";

/// Render the navigation bar with the link for `current_endpoint`'s section
/// highlighted.
pub fn nav_bar(current_endpoint: &str) -> Markup {
    let current = Section::of(current_endpoint);

    html! {
        nav class="bg-white border-gray-200 dark:bg-gray-900"
        {
            div class="max-w-screen-xl flex items-center justify-between mx-auto p-4"
            {
                a href=(endpoints::ROOT) class="text-2xl font-semibold dark:text-white"
                {
                    "Money Tracker"
                }

                ul class="hidden lg:flex lg:space-x-8 font-medium"
                {
                    @for section in Section::ALL {
                        @let is_current = current == Some(section);
                        li
                        {
                            a
                                href=(section.url())
                                class=(if is_current { WIDE_CURRENT_LINK_STYLE } else { WIDE_LINK_STYLE })
                                aria-current=[is_current.then_some("page")]
                            {
                                (section.title())
                            }
                        }
                    }
                }
            }
        }

        nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
        {
            ul
                class="grid grid-cols-2 gap-2 mx-4 mb-4 px-4 py-3 rounded-xl border
                border-gray-200 bg-white shadow-lg dark:border-gray-700 dark:bg-gray-900"
                aria-label="Primary"
            {
                @for section in Section::ALL {
                    @let is_current = current == Some(section);
                    li
                    {
                        a
                            href=(section.url())
                            class=(if is_current { NARROW_CURRENT_LINK_STYLE } else { NARROW_LINK_STYLE })
                            aria-current=[is_current.then_some("page")]
                        {
                            (section.title())
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::{Section, nav_bar};

    #[test]
    fn card_pages_belong_to_cards_section() {
        for endpoint in [
            endpoints::CARDS_VIEW,
            endpoints::CARD_VIEW,
            endpoints::NEW_CARD_VIEW,
            endpoints::EDIT_CARD_VIEW,
            endpoints::NEW_TRANSACTION_VIEW,
        ] {
            assert_eq!(Section::of(endpoint), Some(Section::Cards), "{endpoint}");
        }

        assert_eq!(
            Section::of(endpoints::CATEGORIES_VIEW),
            Some(Section::Categories)
        );
        assert_eq!(Section::of(endpoints::INTERNAL_ERROR_VIEW), None);
        assert_eq!(Section::of(endpoints::POST_CATEGORY), None);
    }

    #[test]
    fn marks_current_section_link() {
        let html = Html::parse_fragment(&nav_bar(endpoints::CATEGORIES_VIEW).into_string());
        let current = Selector::parse("a[aria-current=page]").unwrap();

        let links: Vec<_> = html
            .select(&current)
            .map(|link| link.value().attr("href").unwrap_or_default())
            .collect();

        // One link in each of the wide and narrow layouts.
        assert_eq!(
            links,
            vec![endpoints::CATEGORIES_VIEW, endpoints::CATEGORIES_VIEW]
        );
    }

    #[test]
    fn error_page_has_no_current_link() {
        let html = Html::parse_fragment(&nav_bar(endpoints::INTERNAL_ERROR_VIEW).into_string());
        let current = Selector::parse("a[aria-current=page]").unwrap();

        assert_eq!(html.select(&current).count(), 0);
    }
}
